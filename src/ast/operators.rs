use std::fmt;

use crate::ast::TokenKind;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Comparison
    /// Equal (`eq`)
    Eq,
    /// Not equal (`ne`)
    Ne,
    /// Greater than (`gt`)
    Gt,
    /// Less than (`lt`)
    Lt,
    /// Greater than or equal (`gte`)
    Gte,
    /// Less than or equal (`lte`)
    Lte,
    /// Regular expression match (`reg`), strings only
    Reg,

    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

impl BinOp {
    /// Maps an operator token to its operator. Non-operator tokens give `None`.
    pub const fn from_token_kind(kind: TokenKind) -> Option<BinOp> {
        match kind {
            TokenKind::Eq => Some(BinOp::Eq),
            TokenKind::Ne => Some(BinOp::Ne),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Gte => Some(BinOp::Gte),
            TokenKind::Lte => Some(BinOp::Lte),
            TokenKind::Reg => Some(BinOp::Reg),
            TokenKind::And => Some(BinOp::And),
            TokenKind::Or => Some(BinOp::Or),
            _ => None,
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BinOp::Eq => "eq",
            BinOp::Ne => "ne",
            BinOp::Gt => "gt",
            BinOp::Lt => "lt",
            BinOp::Gte => "gte",
            BinOp::Lte => "lte",
            BinOp::Reg => "reg",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
