//! Operator tokens.
//!
//! Operators stay symbolic at the IR level (`"+"`, `"and"`), but a token is
//! only accepted if it belongs to the fixed set for its position.

use crate::error::ConstructionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a binary operator resolves its result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// Numeric operands, promoted result.
    Arithmetic,
    /// Numeric (or identical) operands, boolean result.
    Comparison,
    /// Boolean operands, boolean result.
    Logical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 16] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::FloorDiv,
        BinaryOperator::Mod,
        BinaryOperator::Pow,
        BinaryOperator::Eq,
        BinaryOperator::Ne,
        BinaryOperator::Lt,
        BinaryOperator::Le,
        BinaryOperator::Gt,
        BinaryOperator::Ge,
        BinaryOperator::And,
        BinaryOperator::Or,
        BinaryOperator::Xor,
    ];

    /// Parse an operator token, rejecting anything outside the allowed set.
    pub fn from_token(token: &str) -> Result<Self, ConstructionError> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == token)
            .ok_or_else(|| ConstructionError::UnknownOperator {
                token: token.to_string(),
                position: "binary",
            })
    }

    pub fn token(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::FloorDiv => "//",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Xor => "xor",
        }
    }

    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::FloorDiv
            | BinaryOperator::Mod
            | BinaryOperator::Pow => OperatorClass::Arithmetic,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => OperatorClass::Comparison,
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => {
                OperatorClass::Logical
            }
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Neg,
    Pos,
    Not,
    BitNot,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 4] = [
        UnaryOperator::Neg,
        UnaryOperator::Pos,
        UnaryOperator::Not,
        UnaryOperator::BitNot,
    ];

    pub fn from_token(token: &str) -> Result<Self, ConstructionError> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == token)
            .ok_or_else(|| ConstructionError::UnknownOperator {
                token: token.to_string(),
                position: "unary",
            })
    }

    pub fn token(self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Pos => "+",
            UnaryOperator::Not => "not",
            UnaryOperator::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        for op in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_token(op.token()).unwrap(), op);
        }
        for op in UnaryOperator::ALL {
            assert_eq!(UnaryOperator::from_token(op.token()).unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_tokens_rejected() {
        assert!(matches!(
            BinaryOperator::from_token("<>"),
            Err(ConstructionError::UnknownOperator { position: "binary", .. })
        ));
        assert!(BinaryOperator::from_token("not").is_err());
        assert!(UnaryOperator::from_token("*").is_err());
    }

    #[test]
    fn test_classes() {
        assert_eq!(BinaryOperator::Add.class(), OperatorClass::Arithmetic);
        assert_eq!(BinaryOperator::Le.class(), OperatorClass::Comparison);
        assert_eq!(BinaryOperator::Xor.class(), OperatorClass::Logical);
    }
}
