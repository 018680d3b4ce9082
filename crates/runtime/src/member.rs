//! Index and member protocols: `index_get`/`index_set` for Array and
//! Dictionary, `get_member`/`set_member` for String, Array, Dictionary
//! and Structure (§4.1). `index_get_storage` is `index_get`'s unwrapped
//! sibling, used only for reading `Account.storage`.
//!
//! Index-set and struct field-set are two of the four mutation sites
//! named in §3.4, and both are "assignment" sites in the sense of §3.2 —
//! so both copy the incoming value here, at the Value Domain boundary,
//! rather than leaving it to every call site in the evaluator to
//! remember. `index_get`/`get_member` are reads and never copy; whether
//! *their* result gets copied depends on what the evaluator does with it
//! (e.g. a `let` binding copies at the binding seam).

use crate::callable::{BoundMethod, Callable, FunctionRegistry};
use crate::integer::{int_value, key_string};
use crate::value::Value;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberFault {
    NoSuchMember { variant: String, name: String },
    NotIndexable(&'static str),
    NotAssignable { variant: &'static str, name: String },
    KeyNotProjectable(&'static str),
    IndexNotInteger(&'static str),
    IndexOutOfRange(i64),
}

impl fmt::Display for MemberFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberFault::NoSuchMember { variant, name } => {
                write!(f, "{variant} has no member `{name}`")
            }
            MemberFault::NotIndexable(variant) => write!(f, "{variant} is not indexable"),
            MemberFault::NotAssignable { variant, name } => {
                write!(f, "{variant}.{name} cannot be assigned")
            }
            MemberFault::KeyNotProjectable(variant) => {
                write!(f, "{variant} cannot be used as a dictionary key")
            }
            MemberFault::IndexNotInteger(variant) => {
                write!(f, "array index must be an integer, got {variant}")
            }
            MemberFault::IndexOutOfRange(i) => write!(f, "index {i} out of range"),
        }
    }
}

type MemberResult<T> = Result<T, MemberFault>;

/// An array's `append(x)`: pushes `x` (already copied by the evaluator at
/// the call's argument-passing seam) onto the shared payload.
struct ArrayAppend(Rc<RefCell<Vec<Value>>>);

impl Callable for ArrayAppend {
    fn call(&self, mut args: Vec<Value>) -> glyph_core::Trampoline<'static, Value> {
        let item = args.pop().unwrap_or(Value::Void);
        self.0.borrow_mut().push(item);
        glyph_core::Trampoline::done(Value::Void)
    }
    fn arity(&self) -> usize {
        1
    }
    fn name(&self) -> &str {
        "append"
    }
}

/// A dictionary's `remove(k)`: projects `k`, deletes if present, and
/// returns `Some(v)` or `Nil` — the Option laws of §3.3/§8.8.
struct DictionaryRemove(Rc<RefCell<std::collections::HashMap<String, Value>>>);

impl Callable for DictionaryRemove {
    fn call(&self, mut args: Vec<Value>) -> glyph_core::Trampoline<'static, Value> {
        let key = args.pop().unwrap_or(Value::Void);
        let result = match key_string(&key) {
            Some(k) => match self.0.borrow_mut().remove(&k) {
                Some(v) => Value::some(v),
                None => Value::Nil,
            },
            None => Value::Nil,
        };
        glyph_core::Trampoline::done(result)
    }
    fn arity(&self) -> usize {
        1
    }
    fn name(&self) -> &str {
        "remove"
    }
}

pub fn get_member(
    value: &Value,
    name: &str,
    registry: &dyn FunctionRegistry,
) -> MemberResult<Value> {
    match value {
        Value::String(s) => match name {
            "length" => Ok(Value::Int(BigInt::from(s.graphemes(true).count()))),
            other => Err(no_such_member("String", other)),
        },
        Value::Array(cell) => match name {
            "length" => Ok(Value::Int(BigInt::from(cell.borrow().len()))),
            "append" => Ok(Value::Function(Rc::new(ArrayAppend(cell.clone())))),
            other => Err(no_such_member("Array", other)),
        },
        Value::Dictionary(cell) => match name {
            "length" => Ok(Value::Int(BigInt::from(cell.borrow().len()))),
            "remove" => Ok(Value::Function(Rc::new(DictionaryRemove(cell.clone())))),
            other => Err(no_such_member("Dictionary", other)),
        },
        Value::Structure(cell) => {
            if let Some(field) = cell.borrow().fields.get(name) {
                return Ok(field.clone());
            }
            let table = {
                let mut data = cell.borrow_mut();
                if data.functions.is_none() {
                    data.functions = registry.functions_for(&data.identifier);
                }
                data.functions.clone()
            };
            let identifier = cell.borrow().identifier.clone();
            match table.and_then(|t| t.get(name)) {
                Some(func) => Ok(Value::Function(Rc::new(BoundMethod {
                    self_value: Value::Structure(cell.clone()),
                    func,
                }))),
                None => Err(no_such_member(&identifier, name)),
            }
        }
        other => Err(no_such_member(other.type_name(), name)),
    }
}

/// Structure field assignment (`self.n = ...`): one of §3.4's four
/// mutation sites, and an assignment seam per §3.2 — copies `value`.
pub fn set_member(value: &Value, name: &str, new_value: Value) -> MemberResult<()> {
    match value {
        Value::Structure(cell) => {
            let mut data = cell.borrow_mut();
            if !data.fields.contains_key(name) {
                return Err(MemberFault::NotAssignable {
                    variant: "Structure",
                    name: name.to_string(),
                });
            }
            data.fields.insert(name.to_string(), new_value.copy());
            Ok(())
        }
        other => Err(MemberFault::NotAssignable {
            variant: other.type_name(),
            name: name.to_string(),
        }),
    }
}

pub fn index_get(value: &Value, key: &Value) -> MemberResult<Value> {
    match value {
        Value::Array(cell) => {
            let idx = array_index(key)?;
            let items = cell.borrow();
            items
                .get(idx)
                .cloned()
                .ok_or(MemberFault::IndexOutOfRange(idx as i64))
        }
        Value::Dictionary(cell) => {
            let k = key_string(key).ok_or_else(|| dict_key_fault(key))?;
            Ok(match cell.borrow().get(&k) {
                Some(v) => Value::some(v.clone()),
                None => Value::Nil,
            })
        }
        other => Err(MemberFault::NotIndexable(other.type_name())),
    }
}

/// Reads `Account.storage[key]` directly, without the `Some`/`Nil`
/// wrapping ordinary dictionary lookups use. Storage models the host's
/// key-value store (the same data `getValue` exposes, just keyed by an
/// arbitrary script-chosen name rather than by the triple `getValue`
/// takes) rather than a scripting-level `Dictionary<T>`, so a miss is
/// `Nil` and a hit is the value itself — there is no second distinct
/// "successful lookup of an absent key" case to disambiguate, unlike
/// `remove`'s Option laws (§8.8).
pub fn index_get_storage(value: &Value, key: &Value) -> MemberResult<Value> {
    match value {
        Value::Dictionary(cell) => {
            let k = key_string(key).ok_or_else(|| dict_key_fault(key))?;
            Ok(cell.borrow().get(&k).cloned().unwrap_or(Value::Nil))
        }
        other => Err(MemberFault::NotIndexable(other.type_name())),
    }
}

/// Index assignment (`a[i] = x`, `d[k] = x`): an assignment seam — copies
/// `new_value`.
pub fn index_set(value: &Value, key: &Value, new_value: Value) -> MemberResult<()> {
    match value {
        Value::Array(cell) => {
            let idx = array_index(key)?;
            let mut items = cell.borrow_mut();
            if idx >= items.len() {
                return Err(MemberFault::IndexOutOfRange(idx as i64));
            }
            items[idx] = new_value.copy();
            Ok(())
        }
        Value::Dictionary(cell) => {
            let k = key_string(key).ok_or_else(|| dict_key_fault(key))?;
            cell.borrow_mut().insert(k, new_value.copy());
            Ok(())
        }
        other => Err(MemberFault::NotIndexable(other.type_name())),
    }
}

fn array_index(key: &Value) -> MemberResult<usize> {
    let n = int_value(key).ok_or_else(|| MemberFault::IndexNotInteger(key.type_name()))?;
    usize::try_from(n).map_err(|_| MemberFault::IndexOutOfRange(n))
}

fn dict_key_fault(key: &Value) -> MemberFault {
    MemberFault::KeyNotProjectable(key.type_name())
}

fn no_such_member(variant: &str, name: &str) -> MemberFault {
    MemberFault::NoSuchMember {
        variant: variant.to_string(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::StructFunctionTable;
    use std::collections::HashMap;

    struct EmptyRegistry;
    impl FunctionRegistry for EmptyRegistry {
        fn functions_for(&self, _id: &str) -> Option<Rc<StructFunctionTable>> {
            None
        }
    }

    #[test]
    fn string_length_is_graphemes_not_bytes() {
        // family emoji "a" + man + zwj + woman + zwj + girl -> 2 grapheme clusters
        let s = Value::String("a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}".to_string());
        assert_eq!(get_member(&s, "length", &EmptyRegistry).unwrap(), Value::Int(BigInt::from(2)));
    }

    #[test]
    fn flag_emoji_is_one_grapheme() {
        let s = Value::String("\u{1F1FA}\u{1F1F8}".to_string());
        assert_eq!(get_member(&s, "length", &EmptyRegistry).unwrap(), Value::Int(BigInt::from(1)));
    }

    #[test]
    fn array_append_mutates_shared_payload() {
        let a = Value::array(vec![Value::Int64(1)]);
        let append = get_member(&a, "append", &EmptyRegistry).unwrap();
        if let Value::Function(f) = append {
            f.call(vec![Value::Int64(2)]).run();
        }
        if let Value::Array(cell) = &a {
            assert_eq!(cell.borrow().len(), 2);
        }
    }

    #[test]
    fn dictionary_remove_follows_option_laws() {
        let d = Value::dictionary({
            let mut m = HashMap::new();
            m.insert(key_string(&Value::String("k".into())).unwrap(), Value::Int64(7));
            m
        });
        let remove = get_member(&d, "remove", &EmptyRegistry).unwrap();
        let removed = if let Value::Function(f) = remove {
            f.call(vec![Value::String("k".into())]).run()
        } else {
            unreachable!()
        };
        assert_eq!(removed, Value::some(Value::Int64(7)));
        assert_eq!(index_get(&d, &Value::String("k".into())).unwrap(), Value::Nil);
    }

    #[test]
    fn storage_read_is_not_option_wrapped_unlike_ordinary_dictionary_read() {
        let d = Value::dictionary({
            let mut m = HashMap::new();
            m.insert(key_string(&Value::String("counter".into())).unwrap(), Value::Int64(1));
            m
        });
        assert_eq!(
            index_get(&d, &Value::String("counter".into())).unwrap(),
            Value::some(Value::Int64(1)),
        );
        assert_eq!(
            index_get_storage(&d, &Value::String("counter".into())).unwrap(),
            Value::Int64(1),
        );
        assert_eq!(index_get_storage(&d, &Value::String("missing".into())).unwrap(), Value::Nil);
    }

    #[test]
    fn dictionary_int_and_uint8_keys_are_distinct_entries() {
        let d = Value::dictionary(HashMap::new());
        index_set(&d, &Value::Int(BigInt::from(1)), Value::String("int-one".into())).unwrap();
        index_set(&d, &Value::UInt8(1), Value::String("u8-one".into())).unwrap();
        if let Value::Dictionary(cell) = &d {
            assert_eq!(cell.borrow().len(), 2);
        }
    }
}
