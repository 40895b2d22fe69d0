//! Rewrite behavior checked through the printer.

use cause_ast::expr::{Expr, ExprKind};
use cause_transform::{rewrite, DeltaRules, Folded, Folder, TransformError};
use cause_types::Type;

fn parse(src: &str) -> Expr {
    let result = cause_parser::parse_source(src);
    assert!(result.is_ok(), "Parse errors in {:?}: {:?}", src, result.errors);
    result.expr.unwrap()
}

fn fold(src: &str) -> Folded {
    rewrite(&parse(src), "δ").unwrap_or_else(|e| panic!("rewrite of {:?} failed: {}", src, e))
}

fn printed(src: &str) -> String {
    fold(src).expr.to_string()
}

fn contains_runtime_form(expr: &Expr) -> bool {
    if expr.kind.is_runtime_form() {
        return true;
    }
    match &expr.kind {
        ExprKind::Unary { operand, .. } => contains_runtime_form(operand),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            contains_runtime_form(left) || contains_runtime_form(right)
        }
        ExprKind::Call { callee, args } => contains_runtime_form(callee) || args.iter().any(contains_runtime_form),
        ExprKind::Conditional { test, consequent, alternate } => {
            contains_runtime_form(test) || contains_runtime_form(consequent) || contains_runtime_form(alternate)
        }
        ExprKind::Array(elements) => elements.iter().any(contains_runtime_form),
        ExprKind::Member { object, property, .. } => contains_runtime_form(object) || contains_runtime_form(property),
        ExprKind::Function { params, body, .. } => {
            params.iter().filter_map(|p| p.default.as_ref()).any(contains_runtime_form) || contains_runtime_form(body)
        }
        _ => false,
    }
}

// ============================================================================
// Value-only input
// ============================================================================

#[test]
fn value_only_inputs_are_unchanged() {
    for src in [
        "a + b * c",
        "[a, b]",
        "t ? a : b",
        "f(x)[0].y",
        "((x) => x)(1)",
        "typeof a === \"number\" && !b",
        "function named(a, b = 2) { return a ?? b; }",
    ] {
        let expr = parse(src);
        let folded = Folder::new(&DeltaRules::default()).fold(&expr).unwrap();
        assert_eq!(folded.expr, expr, "{} changed", src);
        assert!(!contains_runtime_form(&folded.expr));
    }
}

#[test]
fn value_only_types() {
    assert_eq!(fold("a + b").ty, Type::Value);
    assert_eq!(fold("(a) => a").ty, Type::value_to_value());
    assert_eq!(fold("((a) => a)(1)").ty, Type::Value);
}

// ============================================================================
// Delta expressions
// ============================================================================

#[test]
fn bare_delta_is_to_state() {
    let folded = fold("δ[fetch]");
    assert_eq!(folded.ty, Type::to_state());
    assert_eq!(folded.expr.to_string(), "fetch");
}

#[test]
fn member_delta_is_to_state() {
    let folded = fold("response.δ[json]");
    assert_eq!(folded.ty, Type::to_state());
    assert_eq!(folded.expr.to_string(), "response.json");
}

#[test]
fn calling_a_delta_wraps_the_call() {
    let folded = fold("δ[fetch](url)");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(folded.expr.to_string(), "δ(fetch(url))");
}

#[test]
fn custom_namespace() {
    let folded = rewrite(&parse("ns[fetch](url)"), "ns").unwrap();
    assert_eq!(folded.ty, Type::State);
    assert_eq!(folded.expr.to_string(), "δ(fetch(url))");
    // The default identifier is an ordinary name under another namespace.
    assert_eq!(rewrite(&parse("δ[fetch](url)"), "ns").unwrap().ty, Type::Value);
}

// ============================================================================
// Operators, arrays, members
// ============================================================================

#[test]
fn binary_with_state_operand() {
    let folded = fold("δ[load](k) + b");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(
        folded.expr.to_string(),
        r#"δ.depend(true, δ.operators["+"], δ(load(k)), δ.success(b))"#
    );
}

#[test]
fn nested_binary_lifts_inner_value_subtrees_once() {
    assert_eq!(
        printed("(a * 2) + δ[load](k)"),
        r#"δ.depend(true, δ.operators["+"], δ.success(a * 2), δ(load(k)))"#
    );
}

#[test]
fn array_with_state_element() {
    assert_eq!(
        printed("[δ[load](k), b]"),
        r#"δ.depend(true, δ.operators["=([])"], δ(load(k)), δ.success(b))"#
    );
}

#[test]
fn computed_member_with_state_key() {
    assert_eq!(
        printed("table[δ[load](k)]"),
        r#"δ.depend(true, δ.operators["."], δ.success(table), δ(load(k)))"#
    );
}

#[test]
fn call_with_state_argument() {
    let folded = fold("render(δ[load](k), title)");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(
        folded.expr.to_string(),
        "δ.depend(true, δ.success(render), δ(load(k)), δ.success(title))"
    );
}

#[test]
fn state_producing_callee_with_state_argument_is_not_lifted() {
    assert_eq!(
        printed("δ[save](δ[load](k))"),
        "δ.depend(false, δ.success(save), δ(load(k)))"
    );
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn state_test_goes_through_if() {
    let folded = fold("δ[ready](k) ? a : b");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(
        folded.expr.to_string(),
        r#"δ.depend(false, δ["if"], δ(ready(k)), δ.success(() => a), δ.success(() => b))"#
    );
}

#[test]
fn state_test_branches_only_appear_inside_thunks() {
    let folded = fold("δ[ready](k) ? f(a) : g(b)");
    let ExprKind::Depend { args, .. } = &folded.expr.kind else {
        panic!("expected a dependency call, got {}", folded.expr);
    };
    for branch in &args[1..] {
        let ExprKind::Success(inner) = &branch.kind else { panic!("branch not lifted") };
        assert!(matches!(inner.kind, ExprKind::Function { ref params, .. } if params.is_empty()));
    }
}

#[test]
fn state_branch_lifts_the_other_branch() {
    let folded = fold("t ? δ[load](k) : 1");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(folded.expr.to_string(), "t ? δ(load(k)) : δ.success(1)");
}

#[test]
fn matching_function_branches_keep_their_type() {
    assert_eq!(fold("t ? δ[load] : δ[save]").ty, Type::to_state());
    assert_eq!(fold("t ? (x) => x : (y) => y").ty, Type::value_to_value());
}

#[test]
fn call_through_matching_state_branches_is_wrapped() {
    let folded = fold("(t ? δ[load] : δ[save])(k)");
    assert_eq!(folded.ty, Type::State);
    assert_eq!(folded.expr.to_string(), "δ((t ? load : save)(k))");
}

#[test]
fn non_function_mismatch_is_fine() {
    assert_eq!(fold("t ? 1 : \"one\"").ty, Type::Value);
}

#[test]
fn function_mismatch_is_undecidable() {
    let err = rewrite(&parse("t ? (x) => δ[load](x) : (x) => x"), "δ").unwrap_err();
    assert_eq!(
        err,
        TransformError::Undecidable {
            consequent: Type::to_state(),
            alternate: Type::value_to_value(),
            span: cause_ast::Span::new(0, 33),
        }
    );
    assert_eq!(
        err.to_string(),
        "The following expression is too hard to figure out. The consequent returns \
         Function(Value -> State) but the alternate returns Function(Value -> Value). \
         I can currently only handle non-function mismatches."
    );
}

#[test]
fn function_against_value_is_undecidable() {
    let err = rewrite(&parse("t ? (x) => x : 1"), "δ").unwrap_err();
    assert!(matches!(err, TransformError::Undecidable { .. }));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn recursive_function_with_state_branch() {
    let folded = fold("function f(n) { return n ? f(n - 1) : δ[load](n); }");
    assert_eq!(folded.ty, Type::to_state());
    assert_eq!(
        folded.expr.to_string(),
        "function f(n) { return n ? δ.success(f(n - 1)) : δ(load(n)); }"
    );
}

#[test]
fn defaults_are_rewritten() {
    assert_eq!(
        printed("(x = δ[load](k)) => x"),
        "(x = δ(load(k))) => x"
    );
}
