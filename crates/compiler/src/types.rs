//! The checker's own static type set (§4.6) — narrower than, and
//! independent of, `glyph_runtime::TypeTag`: this `Type` only needs to
//! drive inference and signature checking, not describe a live value's
//! runtime shape.

use crate::ast::TypeRef;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
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
    Array(Box<Type>),
    Dictionary(Box<Type>),
    Account,
    Struct(String),
    Option(Box<Type>),
    /// The type of `Account.storage`'s elements: host-facing data the
    /// checker cannot assign one static shape to, since a single
    /// storage dictionary holds whatever a script chooses to put under
    /// each key. Compatible with every other type in both directions
    /// (see `types_compatible`). Indexing a `Dictionary<Dynamic>`
    /// (exclusively `Account.storage` — the grammar has no literal
    /// syntax to construct one directly) reads the stored value itself
    /// rather than an `Option<T>`, unlike an ordinary dictionary lookup:
    /// there is no unwrap construct in the grammar to pull a value back
    /// out of `Some`, and storage needs to round-trip Structures through
    /// method calls (`a.storage["counter"].inc()`-style access after a
    /// `let` binding), not just compare them against `nil`.
    Dynamic,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "Void"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Int => write!(f, "Int"),
            Type::Int8 => write!(f, "Int8"),
            Type::Int16 => write!(f, "Int16"),
            Type::Int32 => write!(f, "Int32"),
            Type::Int64 => write!(f, "Int64"),
            Type::UInt8 => write!(f, "UInt8"),
            Type::UInt16 => write!(f, "UInt16"),
            Type::UInt32 => write!(f, "UInt32"),
            Type::UInt64 => write!(f, "UInt64"),
            Type::Array(t) => write!(f, "Array<{t}>"),
            Type::Dictionary(t) => write!(f, "Dictionary<{t}>"),
            Type::Account => write!(f, "Account"),
            Type::Struct(name) => write!(f, "{name}"),
            Type::Option(t) => write!(f, "Option<{t}>"),
            Type::Dynamic => write!(f, "Dynamic"),
        }
    }
}

impl Type {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Type::Int
                | Type::Int8
                | Type::Int16
                | Type::Int32
                | Type::Int64
                | Type::UInt8
                | Type::UInt16
                | Type::UInt32
                | Type::UInt64
        )
    }

    /// Resolves a parsed `TypeRef` against the set of declared struct
    /// names. Fails for an identifier that names neither a built-in nor a
    /// known struct.
    pub fn resolve(type_ref: &TypeRef, known_structs: &HashSet<String>) -> Result<Type, String> {
        match type_ref {
            TypeRef::Named(name) => match name.as_str() {
                "Void" => Ok(Type::Void),
                "Bool" => Ok(Type::Bool),
                "String" => Ok(Type::String),
                "Int" => Ok(Type::Int),
                "Int8" => Ok(Type::Int8),
                "Int16" => Ok(Type::Int16),
                "Int32" => Ok(Type::Int32),
                "Int64" => Ok(Type::Int64),
                "UInt8" => Ok(Type::UInt8),
                "UInt16" => Ok(Type::UInt16),
                "UInt32" => Ok(Type::UInt32),
                "UInt64" => Ok(Type::UInt64),
                "Account" => Ok(Type::Account),
                other if known_structs.contains(other) => Ok(Type::Struct(other.to_string())),
                other => Err(format!("unknown type `{other}`")),
            },
            TypeRef::Generic { name, argument } => {
                let inner = Type::resolve(argument, known_structs)?;
                match name.as_str() {
                    "Array" => Ok(Type::Array(Box::new(inner))),
                    "Dictionary" => Ok(Type::Dictionary(Box::new(inner))),
                    "Option" => Ok(Type::Option(Box::new(inner))),
                    other => Err(format!("unknown generic type `{other}<...>`")),
                }
            }
        }
    }
}
