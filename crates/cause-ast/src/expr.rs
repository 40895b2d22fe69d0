// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression nodes.
//!
//! The surface kinds cover lambda form: a single expression built from
//! literals, names, operators, calls, member access, arrays, conditionals
//! and function literals. The remaining kinds only appear in rewritten
//! trees and stand for calls into the dependency runtime.

use crate::{NodeId, Span};

/// An expression in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// A node created by a rewrite rather than by the parser.
    pub fn synthetic(kind: ExprKind, span: Span) -> Self {
        Self { id: NodeId::DUMMY, kind, span }
    }

    /// The identifier name, if this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number literal
    Number(f64),
    /// String literal
    String(String),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// Identifier
    Ident(String),
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Short-circuiting operation (`&&`, `||`, `??`)
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Array literal
    Array(Vec<Expr>),
    /// Member access. When `computed` is false, `property` is an identifier
    /// naming the property (`o.p`); otherwise it is evaluated (`o[e]`).
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    /// Function literal with an expression body.
    Function {
        name: Option<String>,
        params: Vec<Param>,
        body: Box<Expr>,
        arrow: bool,
    },

    // Rewriter output
    /// `δ.success(value)`: an already-resolved State.
    Success(Box<Expr>),
    /// `δ(callee(args))`: a deferred call to a State-producing callee.
    Wrap {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `δ.depend(lifted, callee, args...)`: a dependency-construction call.
    Depend {
        lifted: bool,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `δ.operators[name]`
    Operator(String),
    /// A reserved combinator of the namespace, such as `δ["if"]`.
    Intrinsic(Intrinsic),
}

impl ExprKind {
    /// True for kinds that only the rewriter produces.
    pub fn is_runtime_form(&self) -> bool {
        matches!(
            self,
            ExprKind::Success(_)
                | ExprKind::Wrap { .. }
                | ExprKind::Depend { .. }
                | ExprKind::Operator(_)
                | ExprKind::Intrinsic(_)
        )
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Reserved combinators looked up by name on the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// Conditional wait: `(test, consequentThunk, alternateThunk)`.
    If,
}

impl Intrinsic {
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::If => "if",
        }
    }
}

/// Name of the runtime operator for property access.
pub const MEMBER_OPERATOR: &str = ".";

/// Name of the runtime operator for array construction.
pub const ARRAY_OPERATOR: &str = "=([])";

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl BinOp {
    pub const ALL: [BinOp; 21] = [
        BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Mod, BinOp::Pow,
        BinOp::Eq, BinOp::Ne, BinOp::StrictEq, BinOp::StrictNe,
        BinOp::Lt, BinOp::Gt, BinOp::Le, BinOp::Ge, BinOp::In,
        BinOp::BitAnd, BinOp::BitOr, BinOp::BitXor,
        BinOp::Shl, BinOp::Shr, BinOp::UShr,
    ];

    /// The source spelling, which is also the runtime operator name.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinOp::BitOr => 6,
            BinOp::BitXor => 7,
            BinOp::BitAnd => 8,
            BinOp::Eq | BinOp::Ne | BinOp::StrictEq | BinOp::StrictNe => 9,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::In => 10,
            BinOp::Shl | BinOp::Shr | BinOp::UShr => 11,
            BinOp::Add | BinOp::Sub => 12,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 13,
            BinOp::Pow => 14,
        }
    }
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Coalesce,
}

impl LogicalOp {
    pub const ALL: [LogicalOp; 3] = [LogicalOp::And, LogicalOp::Or, LogicalOp::Coalesce];

    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Coalesce => "??",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            LogicalOp::Coalesce | LogicalOp::Or => 4,
            LogicalOp::And => 5,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `~`
    BitNot,
    /// `typeof`
    Typeof,
    /// `void`
    Void,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 6] = [
        UnaryOp::Not, UnaryOp::Neg, UnaryOp::Plus,
        UnaryOp::BitNot, UnaryOp::Typeof, UnaryOp::Void,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
        }
    }

    /// Runtime operator name. Differs from the symbol where a binary
    /// operator already uses the same spelling.
    pub fn operator_name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "unary-",
            UnaryOp::Plus => "unary+",
            other => other.symbol(),
        }
    }
}
