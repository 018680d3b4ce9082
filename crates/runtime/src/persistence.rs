//! The persistence codec: a self-describing binary encoding for the
//! subset of value variants that may outlive one script invocation
//! (§4.3).
//!
//! `Value` itself isn't `Serialize` — `Array`/`Dictionary`/`Structure`
//! hold an `Rc<RefCell<_>>` and `Function` holds a trait object, neither
//! of which bincode can walk. `PersistedValue` mirrors `Value` with owned
//! data in place of shared handles and omits `Function` entirely;
//! `Dictionary` serializes through a `BTreeMap` keyed on `key_string()` so
//! that the same logical mapping always produces identical bytes,
//! matching the determinism a content-addressed or hash-compared storage
//! layer needs.
//!
//! A `Structure` is written as identifier + field mapping only — the
//! persistence-closure invariant of §3.3. Decoding leaves `functions` as
//! `None`; `get_member` (see `crate::member`) re-binds it lazily from the
//! evaluator's registry on first access after load.

use crate::types::TypeTag;
use crate::value::{StructureData, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug)]
pub enum PersistError {
    Unsupported(&'static str),
    Bincode(Box<bincode::Error>),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Unsupported(variant) => {
                write!(f, "{variant} cannot be persisted")
            }
            PersistError::Bincode(e) => write!(f, "persistence codec error: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Bincode(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<bincode::Error> for PersistError {
    fn from(e: bincode::Error) -> Self {
        PersistError::Bincode(Box::new(e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PersistedValue {
    Void,
    Bool(bool),
    String(String),
    Int(num_bigint::BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Array(Vec<PersistedValue>),
    Dictionary(BTreeMap<String, PersistedValue>),
    Structure {
        identifier: String,
        fields: BTreeMap<String, PersistedValue>,
    },
    Nil,
    Some(Box<PersistedValue>),
    MetaType(TypeTag),
    Any(Box<PersistedValue>, TypeTag),
}

impl PersistedValue {
    /// Projects a runtime `Value` into its persisted form. Fails only for
    /// `Function` — the one variant §4.3 leaves out of the registered set.
    pub fn from_value(value: &Value) -> Result<Self, PersistError> {
        match value {
            Value::Void => Ok(PersistedValue::Void),
            Value::Bool(b) => Ok(PersistedValue::Bool(*b)),
            Value::String(s) => Ok(PersistedValue::String(s.clone())),
            Value::Int(n) => Ok(PersistedValue::Int(n.clone())),
            Value::Int8(n) => Ok(PersistedValue::Int8(*n)),
            Value::Int16(n) => Ok(PersistedValue::Int16(*n)),
            Value::Int32(n) => Ok(PersistedValue::Int32(*n)),
            Value::Int64(n) => Ok(PersistedValue::Int64(*n)),
            Value::UInt8(n) => Ok(PersistedValue::UInt8(*n)),
            Value::UInt16(n) => Ok(PersistedValue::UInt16(*n)),
            Value::UInt32(n) => Ok(PersistedValue::UInt32(*n)),
            Value::UInt64(n) => Ok(PersistedValue::UInt64(*n)),
            Value::Array(cell) => {
                let items = cell
                    .borrow()
                    .iter()
                    .map(PersistedValue::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PersistedValue::Array(items))
            }
            Value::Dictionary(cell) => {
                let entries = cell
                    .borrow()
                    .iter()
                    .map(|(k, v)| PersistedValue::from_value(v).map(|pv| (k.clone(), pv)))
                    .collect::<Result<BTreeMap<_, _>, _>>()?;
                Ok(PersistedValue::Dictionary(entries))
            }
            Value::Structure(cell) => {
                let data = cell.borrow();
                let fields = data
                    .fields
                    .iter()
                    .map(|(k, v)| PersistedValue::from_value(v).map(|pv| (k.clone(), pv)))
                    .collect::<Result<BTreeMap<_, _>, _>>()?;
                Ok(PersistedValue::Structure {
                    identifier: data.identifier.clone(),
                    fields,
                })
            }
            Value::Nil => Ok(PersistedValue::Nil),
            Value::Some(inner) => Ok(PersistedValue::Some(Box::new(
                PersistedValue::from_value(inner)?,
            ))),
            Value::MetaType(tag) => Ok(PersistedValue::MetaType(tag.clone())),
            Value::Any(inner, tag) => Ok(PersistedValue::Any(
                Box::new(PersistedValue::from_value(inner)?),
                tag.clone(),
            )),
            Value::Function(_) => Err(PersistError::Unsupported("Function")),
        }
    }

    /// Reconstructs a runtime `Value`. A decoded `Structure`'s function
    /// table is always `None`; it is rebound lazily by `crate::member`.
    pub fn to_value(&self) -> Value {
        match self {
            PersistedValue::Void => Value::Void,
            PersistedValue::Bool(b) => Value::Bool(*b),
            PersistedValue::String(s) => Value::String(s.clone()),
            PersistedValue::Int(n) => Value::Int(n.clone()),
            PersistedValue::Int8(n) => Value::Int8(*n),
            PersistedValue::Int16(n) => Value::Int16(*n),
            PersistedValue::Int32(n) => Value::Int32(*n),
            PersistedValue::Int64(n) => Value::Int64(*n),
            PersistedValue::UInt8(n) => Value::UInt8(*n),
            PersistedValue::UInt16(n) => Value::UInt16(*n),
            PersistedValue::UInt32(n) => Value::UInt32(*n),
            PersistedValue::UInt64(n) => Value::UInt64(*n),
            PersistedValue::Array(items) => {
                Value::array(items.iter().map(PersistedValue::to_value).collect())
            }
            PersistedValue::Dictionary(entries) => Value::dictionary(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            PersistedValue::Structure { identifier, fields } => {
                let fields = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect();
                Value::structure(StructureData::new(identifier.clone(), fields))
            }
            PersistedValue::Nil => Value::Nil,
            PersistedValue::Some(inner) => Value::some(inner.to_value()),
            PersistedValue::MetaType(tag) => Value::MetaType(tag.clone()),
            PersistedValue::Any(inner, tag) => Value::Any(Box::new(inner.to_value()), tag.clone()),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        bincode::serialize(self).map_err(PersistError::from)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        bincode::deserialize(bytes).map_err(PersistError::from)
    }
}

/// Encodes a `Value` straight to bytes; the inverse of [`load`].
pub fn save(value: &Value) -> Result<Vec<u8>, PersistError> {
    PersistedValue::from_value(value)?.to_bytes()
}

/// Decodes bytes straight to a `Value`; the inverse of [`save`].
pub fn load(bytes: &[u8]) -> Result<Value, PersistError> {
    Ok(PersistedValue::from_bytes(bytes)?.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::key_string;
    use std::collections::HashMap;

    #[test]
    fn int_roundtrips() {
        let v = Value::Int(num_bigint::BigInt::from(123456789012345678_i128 as i64));
        let bytes = save(&v).unwrap();
        assert_eq!(load(&bytes).unwrap(), v);
    }

    #[test]
    fn array_roundtrips() {
        let v = Value::array(vec![Value::Int64(1), Value::Bool(true), Value::Nil]);
        let bytes = save(&v).unwrap();
        assert_eq!(load(&bytes).unwrap(), v);
    }

    #[test]
    fn dictionary_roundtrips_through_btreemap() {
        let mut entries = HashMap::new();
        entries.insert(
            key_string(&Value::String("a".to_string())).unwrap(),
            Value::Int64(1),
        );
        let v = Value::dictionary(entries);
        let bytes = save(&v).unwrap();
        assert_eq!(load(&bytes).unwrap(), v);
    }

    #[test]
    fn structure_loses_its_function_table_but_keeps_fields() {
        let mut fields = HashMap::new();
        fields.insert("n".to_string(), Value::Int64(7));
        let v = Value::structure(StructureData::new("Counter", fields));
        let bytes = save(&v).unwrap();
        let back = load(&bytes).unwrap();
        if let Value::Structure(cell) = &back {
            assert_eq!(cell.borrow().fields.get("n"), Some(&Value::Int64(7)));
            assert!(cell.borrow().functions.is_none());
        } else {
            panic!("expected a structure");
        }
    }

    #[test]
    fn meta_type_roundtrips() {
        let v = Value::MetaType(crate::types::TypeTag::Array(Box::new(
            crate::types::TypeTag::Int64,
        )));
        let bytes = save(&v).unwrap();
        assert_eq!(load(&bytes).unwrap(), v);
    }

    #[test]
    fn any_roundtrips_with_its_carried_type() {
        let v = Value::Any(Box::new(Value::Int64(42)), crate::types::TypeTag::Int64);
        let bytes = save(&v).unwrap();
        assert_eq!(load(&bytes).unwrap(), v);
    }

    #[test]
    fn function_values_cannot_be_persisted() {
        struct NoOp;
        impl crate::callable::Callable for NoOp {
            fn call(&self, _args: Vec<Value>) -> glyph_core::Trampoline<'static, Value> {
                glyph_core::Trampoline::done(Value::Void)
            }
            fn arity(&self) -> usize {
                0
            }
            fn name(&self) -> &str {
                "noop"
            }
        }
        let v = Value::Function(std::rc::Rc::new(NoOp));
        assert!(matches!(
            save(&v),
            Err(PersistError::Unsupported("Function"))
        ));
    }

    #[test]
    fn same_logical_dictionary_serializes_identically() {
        let mut a = HashMap::new();
        a.insert(key_string(&Value::String("x".into())).unwrap(), Value::Int64(1));
        a.insert(key_string(&Value::String("y".into())).unwrap(), Value::Int64(2));
        let mut b = HashMap::new();
        b.insert(key_string(&Value::String("y".into())).unwrap(), Value::Int64(2));
        b.insert(key_string(&Value::String("x".into())).unwrap(), Value::Int64(1));
        assert_eq!(
            save(&Value::dictionary(a)).unwrap(),
            save(&Value::dictionary(b)).unwrap()
        );
    }

    #[test]
    fn corrupted_bytes_do_not_panic() {
        assert!(load(&[0xff, 0xff, 0xff]).is_err());
    }
}
