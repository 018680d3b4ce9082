//! Value: the closed set of runtime values the evaluator ever produces.
//!
//! Array, Dictionary and Structure hold their payload behind a shared
//! handle (`Rc<RefCell<_>>`) so that two bindings which alias the same
//! compound observe each other's in-place mutations (§3.2); every other
//! variant is copied by plain Rust value semantics. `copy()` is the
//! language-level operation the evaluator calls at `let`/assignment/
//! struct-literal-field sites — it always produces a structurally
//! independent value, even for the aliasable variants. A call's
//! arguments are bound to their parameters directly (no extra `copy()`
//! at that seam, same as `self`), so mutating a structure passed into a
//! function is visible to the caller's own binding.

use crate::callable::{Callable, StructFunctionTable};
use crate::types::TypeTag;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A structure instance: its type identifier, its field bindings, and a
/// lazily-bound cache of its method table.
///
/// The method table starts `None` for every structure decoded from
/// storage (the persistence codec never writes it, per §3.3's
/// persistence-closure invariant) and is filled in on first member access
/// by consulting the evaluator's [`crate::callable::FunctionRegistry`].
pub struct StructureData {
    pub identifier: String,
    pub fields: HashMap<String, Value>,
    pub functions: Option<Rc<StructFunctionTable>>,
}

impl StructureData {
    pub fn new(identifier: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        StructureData {
            identifier: identifier.into(),
            fields,
            functions: None,
        }
    }
}

#[derive(Clone)]
pub enum Value {
    Void,
    Bool(bool),
    String(String),
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Array(Rc<RefCell<Vec<Value>>>),
    Dictionary(Rc<RefCell<HashMap<String, Value>>>),
    Structure(Rc<RefCell<StructureData>>),
    Nil,
    Some(Box<Value>),
    MetaType(TypeTag),
    Any(Box<Value>, TypeTag),
    Function(Rc<dyn Callable>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn dictionary(entries: HashMap<String, Value>) -> Value {
        Value::Dictionary(Rc::new(RefCell::new(entries)))
    }

    pub fn structure(data: StructureData) -> Value {
        Value::Structure(Rc::new(RefCell::new(data)))
    }

    pub fn some(inner: Value) -> Value {
        Value::Some(Box::new(inner))
    }

    /// The variant name, for diagnostics (`Unreachable` faults name the
    /// offending variant combination).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "Void",
            Value::Bool(_) => "Bool",
            Value::String(_) => "String",
            Value::Int(_) => "Int",
            Value::Int8(_) => "Int8",
            Value::Int16(_) => "Int16",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::UInt8(_) => "UInt8",
            Value::UInt16(_) => "UInt16",
            Value::UInt32(_) => "UInt32",
            Value::UInt64(_) => "UInt64",
            Value::Array(_) => "Array",
            Value::Dictionary(_) => "Dictionary",
            Value::Structure(_) => "Structure",
            Value::Nil => "Nil",
            Value::Some(_) => "Some",
            Value::MetaType(_) => "MetaType",
            Value::Any(_, _) => "Any",
            Value::Function(_) => "Function",
        }
    }

    /// The language-level `copy()`: every compound comes back as a fresh,
    /// independent handle; functions remain shared (they are logically
    /// linked in from the program, not owned data); every other variant
    /// is already independent by Rust value semantics.
    pub fn copy(&self) -> Value {
        match self {
            Value::Array(cell) => {
                let copied: Vec<Value> = cell.borrow().iter().map(Value::copy).collect();
                Value::array(copied)
            }
            Value::Dictionary(cell) => {
                let copied: HashMap<String, Value> = cell
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.copy()))
                    .collect();
                Value::dictionary(copied)
            }
            Value::Structure(cell) => {
                let data = cell.borrow();
                let fields = data
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.copy()))
                    .collect();
                Value::structure(StructureData {
                    identifier: data.identifier.clone(),
                    fields,
                    functions: data.functions.clone(),
                })
            }
            Value::Some(inner) => Value::some(inner.copy()),
            Value::Any(inner, ty) => Value::Any(Box::new(inner.copy()), ty.clone()),
            other => other.clone(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Int8(n) => write!(f, "{n}i8"),
            Value::Int16(n) => write!(f, "{n}i16"),
            Value::Int32(n) => write!(f, "{n}i32"),
            Value::Int64(n) => write!(f, "{n}i64"),
            Value::UInt8(n) => write!(f, "{n}u8"),
            Value::UInt16(n) => write!(f, "{n}u16"),
            Value::UInt32(n) => write!(f, "{n}u32"),
            Value::UInt64(n) => write!(f, "{n}u64"),
            Value::Array(cell) => f.debug_list().entries(cell.borrow().iter()).finish(),
            Value::Dictionary(cell) => f.debug_map().entries(cell.borrow().iter()).finish(),
            Value::Structure(cell) => {
                let data = cell.borrow();
                write!(f, "{} {:?}", data.identifier, data.fields)
            }
            Value::Nil => write!(f, "Nil"),
            Value::Some(inner) => write!(f, "Some({inner:?})"),
            Value::MetaType(t) => write!(f, "MetaType({t})"),
            Value::Any(inner, t) => write!(f, "Any({inner:?}: {t})"),
            Value::Function(c) => write!(f, "{c:?}"),
        }
    }
}

/// Structural equality used by tests and by the evaluator's generic
/// equality dispatch for non-integer variants (Bool, Nil, Some, Void).
/// String equality additionally normalizes to NFC, per §3.3; integer
/// equality is the Integer capability's `eq`, not this impl — see
/// `crate::integer::eq`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use unicode_normalization::UnicodeNormalization;
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => {
                a.nfc().eq(b.nfc())
            }
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::UInt16(a), Value::UInt16(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::UInt64(a), Value::UInt64(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Structure(a), Value::Structure(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (da, db) = (a.borrow(), b.borrow());
                    da.identifier == db.identifier && da.fields == db.fields
                }
            }
            (Value::Some(a), Value::Some(b)) => a == b,
            (Value::MetaType(a), Value::MetaType(b)) => a == b,
            (Value::Any(a, ta), Value::Any(b, tb)) => a == b && ta == tb,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_of_array_is_independent() {
        let a = Value::array(vec![Value::Int64(1), Value::Int64(2)]);
        let b = a.copy();
        if let Value::Array(cell) = &b {
            cell.borrow_mut().push(Value::Int64(3));
        }
        if let Value::Array(cell) = &a {
            assert_eq!(cell.borrow().len(), 2, "copy must not alias the original");
        }
    }

    #[test]
    fn clone_of_array_aliases_the_original() {
        let a = Value::array(vec![Value::Int64(1)]);
        let b = a.clone();
        if let Value::Array(cell) = &b {
            cell.borrow_mut().push(Value::Int64(2));
        }
        if let Value::Array(cell) = &a {
            assert_eq!(cell.borrow().len(), 2, "clone (a rebound alias) must share mutations");
        }
    }

    #[test]
    fn copy_of_structure_shares_function_table_but_deep_copies_fields() {
        let data = StructureData::new("Counter", {
            let mut m = HashMap::new();
            m.insert("n".to_string(), Value::Int64(1));
            m
        });
        let a = Value::structure(data);
        let b = a.copy();
        if let Value::Structure(cell) = &b {
            cell.borrow_mut()
                .fields
                .insert("n".to_string(), Value::Int64(99));
        }
        if let Value::Structure(cell) = &a {
            assert_eq!(cell.borrow().fields.get("n"), Some(&Value::Int64(1)));
        }
    }

    #[test]
    fn string_equality_is_nfc() {
        let composed = Value::String("\u{00e9}".to_string()); // é
        let decomposed = Value::String("e\u{0301}".to_string()); // e + combining acute
        assert_eq!(composed, decomposed);
    }
}
