//! The Host Bridge: conversion between host-native scalars and `Value`
//! (§4.2). This is the only place the runtime crate talks about a
//! non-`Value` representation of data — it exists so the runner can hand
//! a script its arguments and get a result back without either side
//! knowing the other's internal shape.

use crate::value::Value;
use num_bigint::BigInt;
use std::fmt;

/// A host-native scalar, as supplied by or returned to the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    Text(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeUnsupported {
    pub variant: &'static str,
}

impl fmt::Display for BridgeUnsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has no host-bridge representation", self.variant)
    }
}

impl std::error::Error for BridgeUnsupported {}

/// Converts one host scalar into its matching `Value` variant. Never
/// fails — `HostValue`'s variants are exactly the ones §4.2 lists as
/// supported.
pub fn to_value(host: HostValue) -> Value {
    match host {
        HostValue::Int(n) => Value::Int(n),
        HostValue::Int8(n) => Value::Int8(n),
        HostValue::Int16(n) => Value::Int16(n),
        HostValue::Int32(n) => Value::Int32(n),
        HostValue::Int64(n) => Value::Int64(n),
        HostValue::UInt8(n) => Value::UInt8(n),
        HostValue::UInt16(n) => Value::UInt16(n),
        HostValue::UInt32(n) => Value::UInt32(n),
        HostValue::UInt64(n) => Value::UInt64(n),
        HostValue::Bool(b) => Value::Bool(b),
        HostValue::Text(s) => Value::String(s),
        HostValue::Null => Value::Nil,
    }
}

/// Lifts a list of host scalars element-wise.
pub fn to_values(hosts: Vec<HostValue>) -> Vec<Value> {
    hosts.into_iter().map(to_value).collect()
}

/// Converts a `Value` back to its host form, where one exists. Only the
/// scalar variants have a host-native counterpart; Array, Dictionary,
/// Structure, Function and MetaType are rejected, per §3.1's table.
pub fn to_host(value: &Value) -> Result<HostValue, BridgeUnsupported> {
    match value {
        Value::Void => Err(BridgeUnsupported { variant: "Void" }),
        Value::Bool(b) => Ok(HostValue::Bool(*b)),
        Value::String(s) => Ok(HostValue::Text(s.clone())),
        Value::Int(n) => Ok(HostValue::Int(n.clone())),
        Value::Int8(n) => Ok(HostValue::Int8(*n)),
        Value::Int16(n) => Ok(HostValue::Int16(*n)),
        Value::Int32(n) => Ok(HostValue::Int32(*n)),
        Value::Int64(n) => Ok(HostValue::Int64(*n)),
        Value::UInt8(n) => Ok(HostValue::UInt8(*n)),
        Value::UInt16(n) => Ok(HostValue::UInt16(*n)),
        Value::UInt32(n) => Ok(HostValue::UInt32(*n)),
        Value::UInt64(n) => Ok(HostValue::UInt64(*n)),
        Value::Nil => Ok(HostValue::Null),
        Value::Some(inner) => to_host(inner),
        Value::Any(inner, _) => to_host(inner),
        Value::Array(_) | Value::Dictionary(_) | Value::Structure(_) => {
            Err(BridgeUnsupported { variant: value.type_name() })
        }
        Value::MetaType(_) => Err(BridgeUnsupported { variant: "MetaType" }),
        Value::Function(_) => Err(BridgeUnsupported { variant: "Function" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fixed_width_scalars() {
        let v = to_value(HostValue::UInt32(7));
        assert_eq!(v, Value::UInt32(7));
        assert_eq!(to_host(&v).unwrap(), HostValue::UInt32(7));
    }

    #[test]
    fn bigint_round_trips() {
        let n = BigInt::from(123456789012345678_i64);
        let v = to_value(HostValue::Int(n.clone()));
        assert_eq!(to_host(&v).unwrap(), HostValue::Int(n));
    }

    #[test]
    fn compound_variants_have_no_host_form() {
        let a = Value::array(vec![Value::Int64(1)]);
        assert!(to_host(&a).is_err());
    }

    #[test]
    fn null_round_trips_to_nil() {
        assert_eq!(to_value(HostValue::Null), Value::Nil);
        assert_eq!(to_host(&Value::Nil).unwrap(), HostValue::Null);
    }
}
