//! Data-type descriptors and the numeric promotion rule.
//!
//! Types form a closed enum. Equality is structural: two `Type` values are
//! interchangeable exactly when they compare equal, which is also when their
//! [`Type::structural_key`] strings match.
//!
//! # Promotion
//!
//! Binary arithmetic resolves its result type with [`promote`]:
//!
//! - both operands must be numeric (integer, floating or complex);
//! - identical operand types yield that type;
//! - otherwise the operand with the larger byte width wins;
//! - on an exact width tie between different types the left operand wins.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
            IntWidth::W128 => 128,
        }
    }
}

/// Floating-point bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FloatWidth {
    W16,
    W32,
    W64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::W16 => 16,
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
        }
    }
}

/// Complex widths, named after the width of each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexWidth {
    W32,
    W64,
}

impl ComplexWidth {
    pub fn bits(self) -> u32 {
        match self {
            ComplexWidth::W32 => 32,
            ComplexWidth::W64 => 64,
        }
    }
}

/// A data-type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Boolean,
    Int { signed: bool, width: IntWidth },
    Float { width: FloatWidth },
    Complex { width: ComplexWidth },

    // Temporal
    Date,
    Time,
    DateTime,
    Timestamp,

    // Text
    String,
    Utf8String,
    Utf8Char,

    // Collections, optionally parameterized
    List(Option<Box<Type>>),
    Set(Option<Box<Type>>),
    Tuple(Vec<Type>),
    Map(Option<Box<(Type, Type)>>),

    Null,
    /// Top type; unifies with everything.
    Any,
}

impl Type {
    pub const INT8: Type = Type::Int { signed: true, width: IntWidth::W8 };
    pub const INT16: Type = Type::Int { signed: true, width: IntWidth::W16 };
    pub const INT32: Type = Type::Int { signed: true, width: IntWidth::W32 };
    pub const INT64: Type = Type::Int { signed: true, width: IntWidth::W64 };
    pub const INT128: Type = Type::Int { signed: true, width: IntWidth::W128 };
    pub const UINT8: Type = Type::Int { signed: false, width: IntWidth::W8 };
    pub const UINT16: Type = Type::Int { signed: false, width: IntWidth::W16 };
    pub const UINT32: Type = Type::Int { signed: false, width: IntWidth::W32 };
    pub const UINT64: Type = Type::Int { signed: false, width: IntWidth::W64 };
    pub const UINT128: Type = Type::Int { signed: false, width: IntWidth::W128 };
    pub const FLOAT16: Type = Type::Float { width: FloatWidth::W16 };
    pub const FLOAT32: Type = Type::Float { width: FloatWidth::W32 };
    pub const FLOAT64: Type = Type::Float { width: FloatWidth::W64 };
    pub const COMPLEX32: Type = Type::Complex { width: ComplexWidth::W32 };
    pub const COMPLEX64: Type = Type::Complex { width: ComplexWidth::W64 };

    pub fn list(element: Type) -> Self {
        Type::List(Some(Box::new(element)))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Some(Box::new(element)))
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Type::Tuple(elements)
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Some(Box::new((key, value))))
    }

    /// Byte width used for promotion. `None` for non-numeric types.
    pub fn byte_width(&self) -> Option<u32> {
        match self {
            Type::Int { width, .. } => Some(width.bits() / 8),
            Type::Float { width } => Some(width.bits() / 8),
            // Two components per value.
            Type::Complex { width } => Some(width.bits() / 4),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.byte_width().is_some()
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int { .. })
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String | Type::Utf8String | Type::Utf8Char)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Type::Date | Type::Time | Type::DateTime | Type::Timestamp
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Type::List(_) | Type::Set(_) | Type::Tuple(_) | Type::Map(_)
        )
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// Canonical key: equal keys mean interchangeable types.
    pub fn structural_key(&self) -> String {
        self.to_string()
    }

    /// Whether a value of type `value` may initialize a binding of this type.
    ///
    /// Accepts identical types, `Any` on either side, lossless numeric
    /// widening, and collections whose parameters are accepted (an
    /// unspecified parameter unifies with anything).
    pub fn accepts(&self, value: &Type) -> bool {
        if self == value {
            return true;
        }
        match (self, value) {
            (Type::Any, _) | (_, Type::Any) => true,
            (
                Type::Int { signed: s1, width: w1 },
                Type::Int { signed: s2, width: w2 },
            ) => s1 == s2 && w2 <= w1,
            (Type::Float { .. } | Type::Complex { .. }, Type::Int { .. }) => true,
            (Type::Float { width: w1 }, Type::Float { width: w2 }) => w2 <= w1,
            (Type::Complex { .. }, Type::Float { .. }) => true,
            (Type::Complex { width: w1 }, Type::Complex { width: w2 }) => w2 <= w1,
            (Type::List(a), Type::List(b)) | (Type::Set(a), Type::Set(b)) => {
                match (a, b) {
                    (Some(a), Some(b)) => a.accepts(b),
                    _ => true,
                }
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.is_empty() || (a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.accepts(y)))
            }
            (Type::Map(a), Type::Map(b)) => match (a, b) {
                (Some(a), Some(b)) => a.0.accepts(&b.0) && a.1.accepts(&b.1),
                _ => true,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("Boolean"),
            Type::Int { signed: true, width } => write!(f, "Int{}", width.bits()),
            Type::Int { signed: false, width } => write!(f, "UInt{}", width.bits()),
            Type::Float { width } => write!(f, "Float{}", width.bits()),
            Type::Complex { width } => write!(f, "Complex{}", width.bits()),
            Type::Date => f.write_str("Date"),
            Type::Time => f.write_str("Time"),
            Type::DateTime => f.write_str("DateTime"),
            Type::Timestamp => f.write_str("Timestamp"),
            Type::String => f.write_str("String"),
            Type::Utf8String => f.write_str("UTF8String"),
            Type::Utf8Char => f.write_str("UTF8Char"),
            Type::List(None) => f.write_str("List"),
            Type::List(Some(t)) => write!(f, "List[{t}]"),
            Type::Set(None) => f.write_str("Set"),
            Type::Set(Some(t)) => write!(f, "Set[{t}]"),
            Type::Tuple(items) if items.is_empty() => f.write_str("Tuple"),
            Type::Tuple(items) => {
                f.write_str("Tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Type::Map(None) => f.write_str("Map"),
            Type::Map(Some(kv)) => write!(f, "Map[{}, {}]", kv.0, kv.1),
            Type::Null => f.write_str("Null"),
            Type::Any => f.write_str("Any"),
        }
    }
}

/// Result type of a numeric binary operation.
///
/// Fails with [`TypeError::NonNumeric`] naming the first non-numeric operand.
pub fn promote(a: &Type, b: &Type) -> Result<Type, TypeError> {
    let wa = a
        .byte_width()
        .ok_or_else(|| TypeError::NonNumeric(a.clone()))?;
    let wb = b
        .byte_width()
        .ok_or_else(|| TypeError::NonNumeric(b.clone()))?;

    if a == b {
        return Ok(a.clone());
    }
    // Ties keep the left operand.
    Ok(if wb > wa { b.clone() } else { a.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_widths() {
        assert_eq!(Type::INT8.byte_width(), Some(1));
        assert_eq!(Type::UINT128.byte_width(), Some(16));
        assert_eq!(Type::FLOAT16.byte_width(), Some(2));
        assert_eq!(Type::COMPLEX32.byte_width(), Some(8));
        assert_eq!(Type::COMPLEX64.byte_width(), Some(16));
        assert_eq!(Type::String.byte_width(), None);
        assert_eq!(Type::Boolean.byte_width(), None);
    }

    #[test]
    fn test_promote_same_type() {
        for ty in [Type::INT8, Type::UINT64, Type::FLOAT32, Type::COMPLEX64] {
            assert_eq!(promote(&ty, &ty).unwrap(), ty);
        }
    }

    #[test]
    fn test_promote_picks_wider() {
        assert_eq!(promote(&Type::INT8, &Type::INT64).unwrap(), Type::INT64);
        assert_eq!(promote(&Type::FLOAT64, &Type::INT16).unwrap(), Type::FLOAT64);
        assert_eq!(promote(&Type::INT32, &Type::COMPLEX32).unwrap(), Type::COMPLEX32);
    }

    #[test]
    fn test_promote_tie_keeps_left() {
        assert_eq!(promote(&Type::INT32, &Type::UINT32).unwrap(), Type::INT32);
        assert_eq!(promote(&Type::UINT32, &Type::INT32).unwrap(), Type::UINT32);
        assert_eq!(promote(&Type::INT32, &Type::FLOAT32).unwrap(), Type::INT32);
        assert_eq!(promote(&Type::FLOAT64, &Type::INT64).unwrap(), Type::FLOAT64);
    }

    #[test]
    fn test_promote_rejects_non_numeric() {
        assert_eq!(
            promote(&Type::String, &Type::INT32),
            Err(TypeError::NonNumeric(Type::String))
        );
        assert_eq!(
            promote(&Type::INT32, &Type::Boolean),
            Err(TypeError::NonNumeric(Type::Boolean))
        );
    }

    #[test]
    fn test_structural_key() {
        assert_eq!(Type::INT32.structural_key(), "Int32");
        assert_eq!(Type::UINT8.structural_key(), "UInt8");
        assert_eq!(Type::list(Type::INT32).structural_key(), "List[Int32]");
        assert_eq!(
            Type::map(Type::String, Type::FLOAT64).structural_key(),
            "Map[String, Float64]"
        );
        assert_eq!(
            Type::tuple(vec![Type::INT8, Type::Boolean]).structural_key(),
            "Tuple[Int8, Boolean]"
        );
        assert_ne!(Type::list(Type::INT32), Type::list(Type::INT64));
    }

    #[test]
    fn test_accepts() {
        assert!(Type::INT64.accepts(&Type::INT8));
        assert!(!Type::INT8.accepts(&Type::INT64));
        assert!(!Type::UINT64.accepts(&Type::INT8));
        assert!(Type::FLOAT64.accepts(&Type::INT32));
        assert!(Type::Any.accepts(&Type::String));
        assert!(Type::String.accepts(&Type::Any));
        assert!(!Type::String.accepts(&Type::INT32));
        assert!(Type::list(Type::INT64).accepts(&Type::list(Type::INT8)));
        assert!(Type::List(None).accepts(&Type::list(Type::String)));
        assert!(!Type::list(Type::String).accepts(&Type::set(Type::String)));
    }
}
