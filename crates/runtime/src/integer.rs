//! The Integer capability: `{neg, add, sub, mul, div, mod, lt, le, gt, ge,
//! eq}` over any of the nine integer variants, each closed over its own
//! variant (§3.3's integer-closure invariant — cross-variant arithmetic
//! is a fault the static checker is expected to rule out, never something
//! this layer repairs or promotes).
//!
//! Fixed-width arithmetic wraps (two's-complement) rather than panicking
//! or trapping — the spec.md Open Question on overflow, decided here and
//! recorded in DESIGN.md, matching the teacher's own documented choice
//! for its native-integer arithmetic.

use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerFault {
    VariantMismatch { op: &'static str, lhs: &'static str, rhs: &'static str },
    NotAnInteger { op: &'static str, found: &'static str },
    DivisionByZero,
    ModuloByZero,
}

impl fmt::Display for IntegerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerFault::VariantMismatch { op, lhs, rhs } => {
                write!(f, "`{op}` requires two integers of the same variant, got {lhs} and {rhs}")
            }
            IntegerFault::NotAnInteger { op, found } => {
                write!(f, "`{op}` requires an integer, got {found}")
            }
            IntegerFault::DivisionByZero => write!(f, "division by zero"),
            IntegerFault::ModuloByZero => write!(f, "modulo by zero"),
        }
    }
}

type IntResult = Result<Value, IntegerFault>;

pub fn add(a: &Value, b: &Value) -> IntResult {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x + y)),
        (Value::Int8(x), Value::Int8(y)) => Ok(Value::Int8(x.wrapping_add(*y))),
        (Value::Int16(x), Value::Int16(y)) => Ok(Value::Int16(x.wrapping_add(*y))),
        (Value::Int32(x), Value::Int32(y)) => Ok(Value::Int32(x.wrapping_add(*y))),
        (Value::Int64(x), Value::Int64(y)) => Ok(Value::Int64(x.wrapping_add(*y))),
        (Value::UInt8(x), Value::UInt8(y)) => Ok(Value::UInt8(x.wrapping_add(*y))),
        (Value::UInt16(x), Value::UInt16(y)) => Ok(Value::UInt16(x.wrapping_add(*y))),
        (Value::UInt32(x), Value::UInt32(y)) => Ok(Value::UInt32(x.wrapping_add(*y))),
        (Value::UInt64(x), Value::UInt64(y)) => Ok(Value::UInt64(x.wrapping_add(*y))),
        (a, b) => Err(variant_mismatch("add", a, b)),
    }
}

pub fn sub(a: &Value, b: &Value) -> IntResult {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x - y)),
        (Value::Int8(x), Value::Int8(y)) => Ok(Value::Int8(x.wrapping_sub(*y))),
        (Value::Int16(x), Value::Int16(y)) => Ok(Value::Int16(x.wrapping_sub(*y))),
        (Value::Int32(x), Value::Int32(y)) => Ok(Value::Int32(x.wrapping_sub(*y))),
        (Value::Int64(x), Value::Int64(y)) => Ok(Value::Int64(x.wrapping_sub(*y))),
        (Value::UInt8(x), Value::UInt8(y)) => Ok(Value::UInt8(x.wrapping_sub(*y))),
        (Value::UInt16(x), Value::UInt16(y)) => Ok(Value::UInt16(x.wrapping_sub(*y))),
        (Value::UInt32(x), Value::UInt32(y)) => Ok(Value::UInt32(x.wrapping_sub(*y))),
        (Value::UInt64(x), Value::UInt64(y)) => Ok(Value::UInt64(x.wrapping_sub(*y))),
        (a, b) => Err(variant_mismatch("sub", a, b)),
    }
}

pub fn mul(a: &Value, b: &Value) -> IntResult {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x * y)),
        (Value::Int8(x), Value::Int8(y)) => Ok(Value::Int8(x.wrapping_mul(*y))),
        (Value::Int16(x), Value::Int16(y)) => Ok(Value::Int16(x.wrapping_mul(*y))),
        (Value::Int32(x), Value::Int32(y)) => Ok(Value::Int32(x.wrapping_mul(*y))),
        (Value::Int64(x), Value::Int64(y)) => Ok(Value::Int64(x.wrapping_mul(*y))),
        (Value::UInt8(x), Value::UInt8(y)) => Ok(Value::UInt8(x.wrapping_mul(*y))),
        (Value::UInt16(x), Value::UInt16(y)) => Ok(Value::UInt16(x.wrapping_mul(*y))),
        (Value::UInt32(x), Value::UInt32(y)) => Ok(Value::UInt32(x.wrapping_mul(*y))),
        (Value::UInt64(x), Value::UInt64(y)) => Ok(Value::UInt64(x.wrapping_mul(*y))),
        (a, b) => Err(variant_mismatch("mul", a, b)),
    }
}

pub fn div(a: &Value, b: &Value) -> IntResult {
    macro_rules! checked {
        ($variant:ident, $x:expr, $y:expr) => {
            if $y.is_zero() {
                Err(IntegerFault::DivisionByZero)
            } else {
                Ok(Value::$variant($x.wrapping_div(*$y)))
            }
        };
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            if y.is_zero() {
                Err(IntegerFault::DivisionByZero)
            } else {
                Ok(Value::Int(x / y))
            }
        }
        (Value::Int8(x), Value::Int8(y)) => checked!(Int8, x, y),
        (Value::Int16(x), Value::Int16(y)) => checked!(Int16, x, y),
        (Value::Int32(x), Value::Int32(y)) => checked!(Int32, x, y),
        (Value::Int64(x), Value::Int64(y)) => checked!(Int64, x, y),
        (Value::UInt8(x), Value::UInt8(y)) => checked!(UInt8, x, y),
        (Value::UInt16(x), Value::UInt16(y)) => checked!(UInt16, x, y),
        (Value::UInt32(x), Value::UInt32(y)) => checked!(UInt32, x, y),
        (Value::UInt64(x), Value::UInt64(y)) => checked!(UInt64, x, y),
        (a, b) => Err(variant_mismatch("div", a, b)),
    }
}

pub fn rem(a: &Value, b: &Value) -> IntResult {
    macro_rules! checked {
        ($variant:ident, $x:expr, $y:expr) => {
            if $y.is_zero() {
                Err(IntegerFault::ModuloByZero)
            } else {
                Ok(Value::$variant($x.wrapping_rem(*$y)))
            }
        };
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            if y.is_zero() {
                Err(IntegerFault::ModuloByZero)
            } else {
                Ok(Value::Int(x % y))
            }
        }
        (Value::Int8(x), Value::Int8(y)) => checked!(Int8, x, y),
        (Value::Int16(x), Value::Int16(y)) => checked!(Int16, x, y),
        (Value::Int32(x), Value::Int32(y)) => checked!(Int32, x, y),
        (Value::Int64(x), Value::Int64(y)) => checked!(Int64, x, y),
        (Value::UInt8(x), Value::UInt8(y)) => checked!(UInt8, x, y),
        (Value::UInt16(x), Value::UInt16(y)) => checked!(UInt16, x, y),
        (Value::UInt32(x), Value::UInt32(y)) => checked!(UInt32, x, y),
        (Value::UInt64(x), Value::UInt64(y)) => checked!(UInt64, x, y),
        (a, b) => Err(variant_mismatch("mod", a, b)),
    }
}

pub fn neg(a: &Value) -> IntResult {
    match a {
        Value::Int(x) => Ok(Value::Int(-x)),
        Value::Int8(x) => Ok(Value::Int8(x.wrapping_neg())),
        Value::Int16(x) => Ok(Value::Int16(x.wrapping_neg())),
        Value::Int32(x) => Ok(Value::Int32(x.wrapping_neg())),
        Value::Int64(x) => Ok(Value::Int64(x.wrapping_neg())),
        // Unsigned negation wraps too (two's complement), matching the
        // fixed-width overflow decision above.
        Value::UInt8(x) => Ok(Value::UInt8(x.wrapping_neg())),
        Value::UInt16(x) => Ok(Value::UInt16(x.wrapping_neg())),
        Value::UInt32(x) => Ok(Value::UInt32(x.wrapping_neg())),
        Value::UInt64(x) => Ok(Value::UInt64(x.wrapping_neg())),
        other => Err(IntegerFault::NotAnInteger { op: "neg", found: other.type_name() }),
    }
}

fn compare(a: &Value, b: &Value) -> Result<std::cmp::Ordering, IntegerFault> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Int8(x), Value::Int8(y)) => Ok(x.cmp(y)),
        (Value::Int16(x), Value::Int16(y)) => Ok(x.cmp(y)),
        (Value::Int32(x), Value::Int32(y)) => Ok(x.cmp(y)),
        (Value::Int64(x), Value::Int64(y)) => Ok(x.cmp(y)),
        (Value::UInt8(x), Value::UInt8(y)) => Ok(x.cmp(y)),
        (Value::UInt16(x), Value::UInt16(y)) => Ok(x.cmp(y)),
        (Value::UInt32(x), Value::UInt32(y)) => Ok(x.cmp(y)),
        (Value::UInt64(x), Value::UInt64(y)) => Ok(x.cmp(y)),
        (a, b) => Err(variant_mismatch("compare", a, b)),
    }
}

pub fn lt(a: &Value, b: &Value) -> Result<bool, IntegerFault> {
    Ok(compare(a, b)?.is_lt())
}
pub fn le(a: &Value, b: &Value) -> Result<bool, IntegerFault> {
    Ok(compare(a, b)?.is_le())
}
pub fn gt(a: &Value, b: &Value) -> Result<bool, IntegerFault> {
    Ok(compare(a, b)?.is_gt())
}
pub fn ge(a: &Value, b: &Value) -> Result<bool, IntegerFault> {
    Ok(compare(a, b)?.is_ge())
}
pub fn eq(a: &Value, b: &Value) -> Result<bool, IntegerFault> {
    Ok(compare(a, b)?.is_eq())
}

/// Best-effort narrowing to a native `i64`, used by the host bridge and by
/// `getValue`/`setValue`'s big-endian byte encoding. Overflow during
/// narrowing is undefined at this layer per §4.1; we saturate rather than
/// wrap since this is an export path, not arithmetic.
pub fn int_value(v: &Value) -> Option<i64> {
    match v {
        Value::Int(x) => x.to_i64(),
        Value::Int8(x) => Some(*x as i64),
        Value::Int16(x) => Some(*x as i64),
        Value::Int32(x) => Some(*x as i64),
        Value::Int64(x) => Some(*x),
        Value::UInt8(x) => Some(*x as i64),
        Value::UInt16(x) => Some(*x as i64),
        Value::UInt32(x) => Some(*x as i64),
        Value::UInt64(x) => i64::try_from(*x).ok(),
        _ => None,
    }
}

/// `key_string()`: the projection used for Dictionary identity (§3.1,
/// §4.1). Defined for every integer variant and for String.
pub fn key_string(v: &Value) -> Option<String> {
    match v {
        Value::Int(x) => Some(format!("int:{x}")),
        Value::Int8(x) => Some(format!("i8:{x}")),
        Value::Int16(x) => Some(format!("i16:{x}")),
        Value::Int32(x) => Some(format!("i32:{x}")),
        Value::Int64(x) => Some(format!("i64:{x}")),
        Value::UInt8(x) => Some(format!("u8:{x}")),
        Value::UInt16(x) => Some(format!("u16:{x}")),
        Value::UInt32(x) => Some(format!("u32:{x}")),
        Value::UInt64(x) => Some(format!("u64:{x}")),
        Value::String(s) => {
            use unicode_normalization::UnicodeNormalization;
            Some(format!("str:{}", s.nfc().collect::<String>()))
        }
        _ => None,
    }
}

fn variant_mismatch(op: &'static str, a: &Value, b: &Value) -> IntegerFault {
    IntegerFault::VariantMismatch { op, lhs: a.type_name(), rhs: b.type_name() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_variant_add_stays_in_variant() {
        assert_eq!(add(&Value::Int32(2), &Value::Int32(3)).unwrap(), Value::Int32(5));
        assert_eq!(
            add(&Value::Int(BigInt::from(2)), &Value::Int(BigInt::from(3))).unwrap(),
            Value::Int(BigInt::from(5))
        );
    }

    #[test]
    fn cross_variant_add_is_a_fault() {
        assert!(add(&Value::Int8(1), &Value::Int32(1)).is_err());
    }

    #[test]
    fn fixed_width_add_wraps() {
        assert_eq!(add(&Value::Int8(i8::MAX), &Value::Int8(1)).unwrap(), Value::Int8(i8::MIN));
        assert_eq!(add(&Value::UInt8(u8::MAX), &Value::UInt8(1)).unwrap(), Value::UInt8(0));
    }

    #[test]
    fn division_by_zero_is_a_fault_not_a_panic() {
        assert_eq!(div(&Value::Int64(1), &Value::Int64(0)).unwrap_err(), IntegerFault::DivisionByZero);
    }

    #[test]
    fn key_string_distinguishes_int_and_uint8() {
        assert_ne!(key_string(&Value::Int(BigInt::from(1))), key_string(&Value::UInt8(1)));
    }
}
