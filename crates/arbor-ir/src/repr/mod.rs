//! Structural representation of trees for inspection and golden tests.
//!
//! [`Ast::get_struct`] turns a subtree into a [`ReprStruct`]: nested
//! single-entry maps keyed by a node tag such as `BINARY[+]`. Maps keep
//! insertion order so the output is deterministic and diffable.
//!
//! # Fidelity
//!
//! - [`Fidelity::Simplified`]: `{ "BINARY[+]": { "lhs": ..., "rhs": ... } }`
//! - [`Fidelity::Full`]: the key gains the node's instance tag and the
//!   content is wrapped with metadata:
//!
//! ```text
//! { "BINARY[+]#42": {
//!     "content": { "lhs": ..., "rhs": ... },
//!     "metadata": { "loc": { "line": 3, "col": 5 }, "comment": "",
//!                   "ref": 42, "kind": "BinaryOp", "type": "Int32" } } }
//! ```

mod serialize;

use crate::error::{NodeError, ReprError};
use crate::node::{Ast, NodeId};
use serde::de::{self, MapAccess, SeqAccess};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How much detail [`Ast::get_struct`] includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fidelity {
    /// Tags and content plus location, comment, instance tag and kind.
    #[default]
    Full,
    /// Tags and content only.
    Simplified,
}

/// A JSON-like value with ordered maps.
#[derive(Debug, Clone, PartialEq)]
pub enum ReprStruct {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    List(Vec<ReprStruct>),
    Map(Vec<(String, ReprStruct)>),
}

impl ReprStruct {
    pub fn empty_map() -> Self {
        ReprStruct::Map(Vec::new())
    }

    /// Single-entry map `{ key: value }`.
    pub fn entry(key: impl Into<String>, value: ReprStruct) -> Self {
        ReprStruct::Map(vec![(key.into(), value)])
    }

    pub fn str(value: impl Into<String>) -> Self {
        ReprStruct::Str(value.into())
    }

    /// Value under `key`, if this is a map that has it.
    pub fn get(&self, key: &str) -> Option<&ReprStruct> {
        match self {
            ReprStruct::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Value of a single-entry map, i.e. the content under a node tag.
    pub fn single_value(&self) -> Option<&ReprStruct> {
        match self {
            ReprStruct::Map(entries) if entries.len() == 1 => Some(&entries[0].1),
            _ => None,
        }
    }

    /// Keys of a map in order; empty for other values.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            ReprStruct::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReprStruct::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ReprStruct]> {
        match self {
            ReprStruct::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, ReprError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, ReprError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ReprError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Serialize for ReprStruct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReprStruct::Bool(b) => serializer.serialize_bool(*b),
            // JSON numbers outside the 64-bit ranges lose precision on the way
            // back, so those are written as decimal strings.
            ReprStruct::Int(i) => match (i64::try_from(*i), u64::try_from(*i)) {
                (Ok(small), _) => serializer.serialize_i64(small),
                (_, Ok(small)) => serializer.serialize_u64(small),
                _ => serializer.serialize_str(&i.to_string()),
            },
            ReprStruct::Float(f) if f.is_nan() => serializer.serialize_str("nan"),
            ReprStruct::Float(f) if f.is_infinite() => {
                serializer.serialize_str(if *f > 0.0 { "inf" } else { "-inf" })
            }
            ReprStruct::Float(f) => serializer.serialize_f64(*f),
            ReprStruct::Str(s) => serializer.serialize_str(s),
            ReprStruct::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ReprStruct::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ReprStruct {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ReprVisitor)
    }
}

struct ReprVisitor;

impl<'de> de::Visitor<'de> for ReprVisitor {
    type Value = ReprStruct;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a structural representation value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Int(v.into()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Int(v.into()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<ReprStruct, E> {
        i128::try_from(v)
            .map(ReprStruct::Int)
            .map_err(|_| E::custom(format!("integer {v} does not fit in i128")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ReprStruct, E> {
        Ok(ReprStruct::Str(v))
    }

    // `null` only appears as an absent value, which is an empty map here.
    fn visit_unit<E: de::Error>(self) -> Result<ReprStruct, E> {
        Ok(ReprStruct::empty_map())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ReprStruct, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ReprStruct::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ReprStruct, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((k, v)) = map.next_entry::<String, ReprStruct>()? {
            entries.push((k, v));
        }
        Ok(ReprStruct::Map(entries))
    }
}

/// Equality that ignores locations, comments and instance tags.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for ReprStruct {
    fn structure_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReprStruct::List(a), ReprStruct::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structure_eq(y))
            }
            (ReprStruct::Map(a), ReprStruct::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.structure_eq(vb))
            }
            // Bitwise so that NaN literals compare equal to themselves.
            (ReprStruct::Float(a), ReprStruct::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl Ast {
    pub fn to_json(&self, id: NodeId, fidelity: Fidelity) -> Result<String, ReprError> {
        self.get_struct(id, fidelity)?.to_json()
    }

    pub fn to_yaml(&self, id: NodeId, fidelity: Fidelity) -> Result<String, ReprError> {
        self.get_struct(id, fidelity)?.to_yaml()
    }

    /// Whether two subtrees, possibly from different trees, have the same shape.
    pub fn structure_eq(&self, id: NodeId, other: &Ast, other_id: NodeId) -> Result<bool, NodeError> {
        let a = self.get_struct(id, Fidelity::Simplified)?;
        let b = other.get_struct(other_id, Fidelity::Simplified)?;
        Ok(a.structure_eq(&b))
    }
}
