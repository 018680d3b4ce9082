//! Static type descriptors carried by `MetaType` and `Any` values.
//!
//! This is deliberately smaller than the checker's own `Type` (see
//! `glyph-compiler`): it exists only so a runtime value can name its own
//! shape, not to drive inference.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Void,
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Array(Box<TypeTag>),
    Dictionary(Box<TypeTag>),
    Structure(String),
    Option(Box<TypeTag>),
    Account,
    Function,
    Any,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Void => write!(f, "Void"),
            TypeTag::Bool => write!(f, "Bool"),
            TypeTag::String => write!(f, "String"),
            TypeTag::Int => write!(f, "Int"),
            TypeTag::Int8 => write!(f, "Int8"),
            TypeTag::Int16 => write!(f, "Int16"),
            TypeTag::Int32 => write!(f, "Int32"),
            TypeTag::Int64 => write!(f, "Int64"),
            TypeTag::UInt8 => write!(f, "UInt8"),
            TypeTag::UInt16 => write!(f, "UInt16"),
            TypeTag::UInt32 => write!(f, "UInt32"),
            TypeTag::UInt64 => write!(f, "UInt64"),
            TypeTag::Array(t) => write!(f, "Array<{t}>"),
            TypeTag::Dictionary(t) => write!(f, "Dictionary<{t}>"),
            TypeTag::Structure(name) => write!(f, "{name}"),
            TypeTag::Option(t) => write!(f, "Option<{t}>"),
            TypeTag::Account => write!(f, "Account"),
            TypeTag::Function => write!(f, "Function"),
            TypeTag::Any => write!(f, "Any"),
        }
    }
}
