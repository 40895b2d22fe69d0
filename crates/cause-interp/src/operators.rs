// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Operator semantics and the runtime operator table.
//!
//! Conversions follow JavaScript: `+` concatenates when either side is a
//! string, comparisons fall back to numbers, bitwise operators work on
//! 32-bit integers.

use std::cmp::Ordering;
use std::rc::Rc;

use cause_ast::expr::{BinOp, LogicalOp, UnaryOp, ARRAY_OPERATOR, MEMBER_OPERATOR};
use cause_ast::print::format_number;

use crate::interp::RuntimeError;
use crate::value::Value;

// ============================================================================
// Conversions
// ============================================================================

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub fn nullish(value: &Value) -> bool {
    matches!(value, Value::Undefined | Value::Null)
}

pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        Value::Number(n) => *n,
        Value::String(s) => parse_number(s),
        Value::Array(_) => parse_number(&to_js_string(value)),
        _ => f64::NAN,
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    let prefixed = |prefix: &[&str], radix: u32| {
        prefix
            .iter()
            .find_map(|p| s.strip_prefix(p))
            .map(|digits| u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64))
    };
    if let Some(n) = prefixed(&["0x", "0X"], 16)
        .or_else(|| prefixed(&["0b", "0B"], 2))
        .or_else(|| prefixed(&["0o", "0O"], 8))
    {
        return n;
    }
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf" and "nan"; JavaScript does not.
        _ if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => s.parse().unwrap_or(f64::NAN),
    }
}

/// The string a value converts to in `+` and property keys.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| if nullish(item) { String::new() } else { to_js_string(item) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Function(_) | Value::Native(_) => value.to_string(),
        Value::State(state) => state.to_string(),
    }
}

fn to_int32(value: &Value) -> i32 {
    let n = to_number(value);
    if !n.is_finite() {
        return 0;
    }
    (n.trunc().rem_euclid(4_294_967_296.0) as u32) as i32
}

fn to_uint32(value: &Value) -> u32 {
    to_int32(value) as u32
}

pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Function(_) | Value::Native(_) => "function",
        Value::Null | Value::Array(_) | Value::Object(_) | Value::State(_) => "object",
    }
}

// ============================================================================
// Equality
// ============================================================================

pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
        (Value::State(a), Value::State(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

pub fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (x, y) if nullish(x) || nullish(y) => nullish(x) && nullish(y),
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            to_number(a) == to_number(b)
        }
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(to_number(b))),
        (Value::Array(_) | Value::Object(_), Value::Number(_) | Value::String(_)) => {
            loose_equals(&Value::string(to_js_string(a)), b)
        }
        (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_)) => {
            loose_equals(a, &Value::string(to_js_string(b)))
        }
        _ => strict_equals(a, b),
    }
}

// ============================================================================
// Operators
// ============================================================================

pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let num = |f: fn(f64, f64) -> f64| Value::Number(f(to_number(left), to_number(right)));
    let int = |f: fn(i32, i32) -> i32| Value::Number(f(to_int32(left), to_int32(right)) as f64);
    let shift = || to_uint32(right) & 31;

    Ok(match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => num(|a, b| a - b),
        BinOp::Mul => num(|a, b| a * b),
        BinOp::Div => num(|a, b| a / b),
        BinOp::Mod => num(|a, b| a % b),
        BinOp::Pow => num(f64::powf),
        BinOp::Eq => Value::Bool(loose_equals(left, right)),
        BinOp::Ne => Value::Bool(!loose_equals(left, right)),
        BinOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinOp::StrictNe => Value::Bool(!strict_equals(left, right)),
        BinOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinOp::Le => Value::Bool(matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal))),
        BinOp::Ge => Value::Bool(matches!(compare(left, right), Some(Ordering::Greater | Ordering::Equal))),
        BinOp::In => Value::Bool(has_property(right, &property_key(left))?),
        BinOp::BitAnd => int(|a, b| a & b),
        BinOp::BitOr => int(|a, b| a | b),
        BinOp::BitXor => int(|a, b| a ^ b),
        BinOp::Shl => Value::Number(to_int32(left).wrapping_shl(shift()) as f64),
        BinOp::Shr => Value::Number((to_int32(left) >> shift()) as f64),
        BinOp::UShr => Value::Number((to_uint32(left) >> shift()) as f64),
    })
}

fn add(left: &Value, right: &Value) -> Value {
    let stringish = |v: &Value| {
        matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Native(_))
    };
    if stringish(left) || stringish(right) {
        Value::string(to_js_string(left) + &to_js_string(right))
    } else {
        Value::Number(to_number(left) + to_number(right))
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

pub fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!truthy(operand)),
        UnaryOp::Neg => Value::Number(-to_number(operand)),
        UnaryOp::Plus => Value::Number(to_number(operand)),
        UnaryOp::BitNot => Value::Number(!to_int32(operand) as f64),
        UnaryOp::Typeof => Value::string(type_of(operand)),
        UnaryOp::Void => Value::Undefined,
    }
}

pub fn logical(op: LogicalOp, left: Value, right: Value) -> Value {
    let take_left = match op {
        LogicalOp::And => !truthy(&left),
        LogicalOp::Or => truthy(&left),
        LogicalOp::Coalesce => !nullish(&left),
    };
    if take_left { left } else { right }
}

// ============================================================================
// Properties
// ============================================================================

/// The key a value names when used as a property.
pub fn property_key(value: &Value) -> String {
    to_js_string(value)
}

pub fn get_property(object: &Value, key: &str) -> Result<Value, RuntimeError> {
    Ok(match object {
        Value::Undefined | Value::Null => {
            return Err(RuntimeError::TypeError(format!(
                "Cannot read properties of {} (reading '{}')",
                object.type_name(),
                key
            )))
        }
        Value::Object(entries) => entries.get(key).cloned().unwrap_or(Value::Undefined),
        Value::Array(items) => match key {
            "length" => Value::Number(items.len() as f64),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Undefined),
        },
        Value::String(s) => {
            // Lengths and indices count UTF-16 code units.
            let units: Vec<u16> = s.encode_utf16().collect();
            match key {
                "length" => Value::Number(units.len() as f64),
                _ => key
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| units.get(i))
                    .map(|u| Value::string(String::from_utf16_lossy(&[*u])))
                    .unwrap_or(Value::Undefined),
            }
        }
        _ => Value::Undefined,
    })
}

fn has_property(object: &Value, key: &str) -> Result<bool, RuntimeError> {
    match object {
        Value::Object(entries) => Ok(entries.contains_key(key)),
        Value::Array(items) => Ok(key == "length" || key.parse::<usize>().is_ok_and(|i| i < items.len())),
        _ => Err(RuntimeError::TypeError(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            key, object
        ))),
    }
}

// ============================================================================
// Operator table
// ============================================================================

/// Every name [`lookup`] resolves.
pub fn names() -> impl Iterator<Item = &'static str> {
    BinOp::ALL
        .into_iter()
        .map(BinOp::symbol)
        .chain(LogicalOp::ALL.into_iter().map(LogicalOp::symbol))
        .chain(UnaryOp::ALL.into_iter().map(UnaryOp::operator_name))
        .chain([MEMBER_OPERATOR, ARRAY_OPERATOR])
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Undefined)
}

/// The operator named `name` as a callable value.
pub fn lookup(name: &str) -> Option<Value> {
    if let Some(op) = BinOp::ALL.into_iter().find(|op| op.symbol() == name) {
        return Some(Value::native(name, move |_, args| binary(op, &arg(&args, 0), &arg(&args, 1))));
    }
    if let Some(op) = LogicalOp::ALL.into_iter().find(|op| op.symbol() == name) {
        return Some(Value::native(name, move |_, args| Ok(logical(op, arg(&args, 0), arg(&args, 1)))));
    }
    if let Some(op) = UnaryOp::ALL.into_iter().find(|op| op.operator_name() == name) {
        return Some(Value::native(name, move |_, args| Ok(unary(op, &arg(&args, 0)))));
    }
    match name {
        MEMBER_OPERATOR => Some(Value::native(name, |_, args| {
            get_property(&arg(&args, 0), &property_key(&arg(&args, 1)))
        })),
        ARRAY_OPERATOR => Some(Value::native(name, |_, args| Ok(Value::array(args)))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::string(v)
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    #[test]
    fn addition_concatenates_strings() {
        assert_eq!(binary(BinOp::Add, &n(1.0), &n(2.0)).unwrap(), n(3.0));
        assert_eq!(binary(BinOp::Add, &s("a"), &n(1.0)).unwrap(), s("a1"));
        assert_eq!(binary(BinOp::Add, &n(1.0), &Value::array(vec![n(2.0), n(3.0)])).unwrap(), s("12,3"));
    }

    #[test]
    fn nan_results() {
        let result = binary(BinOp::Add, &Value::Undefined, &n(1.0)).unwrap();
        assert!(matches!(result, Value::Number(x) if x.is_nan()));
        assert!(to_number(&s("abc")).is_nan());
        assert!(to_number(&s("inf")).is_nan());
        assert_eq!(to_number(&s(" 0x10 ")), 16.0);
        assert_eq!(to_number(&s("")), 0.0);
        assert_eq!(to_number(&s("1e3")), 1000.0);
    }

    #[test]
    fn equality() {
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(!strict_equals(&Value::Null, &Value::Undefined));
        assert!(loose_equals(&s("1"), &n(1.0)));
        assert!(loose_equals(&Value::Bool(true), &n(1.0)));
        assert!(!loose_equals(&Value::Null, &n(0.0)));
        assert!(!strict_equals(&n(f64::NAN), &n(f64::NAN)));
        let array = Value::array(vec![]);
        assert!(strict_equals(&array, &array.clone()));
        assert!(!strict_equals(&array, &Value::array(vec![])));
    }

    #[test]
    fn comparisons() {
        assert_eq!(binary(BinOp::Lt, &s("a"), &s("b")).unwrap(), Value::Bool(true));
        assert_eq!(binary(BinOp::Lt, &s("10"), &n(9.0)).unwrap(), Value::Bool(false));
        assert_eq!(binary(BinOp::Ge, &n(f64::NAN), &n(1.0)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn bitwise() {
        assert_eq!(binary(BinOp::BitOr, &n(1.5), &n(2.0)).unwrap(), n(3.0));
        assert_eq!(binary(BinOp::Shl, &n(1.0), &n(33.0)).unwrap(), n(2.0));
        assert_eq!(binary(BinOp::UShr, &n(-1.0), &n(0.0)).unwrap(), n(4294967295.0));
        assert_eq!(binary(BinOp::Shr, &n(-8.0), &n(1.0)).unwrap(), n(-4.0));
        assert_eq!(unary(UnaryOp::BitNot, &n(0.0)), n(-1.0));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(unary(UnaryOp::Typeof, &Value::Null), s("object"));
        assert_eq!(unary(UnaryOp::Neg, &s("2")), n(-2.0));
        assert_eq!(unary(UnaryOp::Not, &s("")), Value::Bool(true));
        assert_eq!(unary(UnaryOp::Void, &n(1.0)), Value::Undefined);
    }

    #[test]
    fn logical_operators_pick_an_operand() {
        assert_eq!(logical(LogicalOp::And, n(0.0), s("x")), n(0.0));
        assert_eq!(logical(LogicalOp::Or, n(0.0), s("x")), s("x"));
        assert_eq!(logical(LogicalOp::Coalesce, n(0.0), s("x")), n(0.0));
        assert_eq!(logical(LogicalOp::Coalesce, Value::Null, s("x")), s("x"));
    }

    #[test]
    fn properties() {
        let array = Value::array(vec![n(1.0), n(2.0)]);
        assert_eq!(get_property(&array, "length").unwrap(), n(2.0));
        assert_eq!(get_property(&array, "1").unwrap(), n(2.0));
        assert_eq!(get_property(&s("δx"), "length").unwrap(), n(2.0));
        assert!(get_property(&Value::Undefined, "x").is_err());
        assert_eq!(binary(BinOp::In, &n(1.0), &array).unwrap(), Value::Bool(true));
        assert!(binary(BinOp::In, &s("x"), &n(1.0)).is_err());
    }

    #[test]
    fn every_name_resolves() {
        for name in names() {
            assert!(lookup(name).is_some(), "operator {:?} missing", name);
        }
        assert!(lookup("nope").is_none());
    }
}
