//! Entry-contract storage plumbing (§6): each signing account's `main`
//! argument is an `Account` structure whose `storage` field is loaded
//! from, and written back to, the single blob at
//! (owner=address, controller=∅, key="storage").

use std::collections::HashMap;

use glyph_core::ScriptError;
use glyph_runtime::{persistence, StructureData, Value};

use crate::host::HostCallbacks;

const STORAGE_KEY: &[u8] = b"storage";

pub fn load_account(host: &dyn HostCallbacks, address: &[u8]) -> Result<Value, ScriptError> {
    let bytes = host.get_value(address, &[], STORAGE_KEY)?;
    let storage = if bytes.is_empty() {
        Value::dictionary(HashMap::new())
    } else {
        persistence::load(&bytes).map_err(|e| ScriptError::decode(e.to_string()))?
    };
    let mut fields = HashMap::new();
    fields.insert("address".to_string(), Value::String(hex::encode(address)));
    fields.insert("storage".to_string(), storage);
    Ok(Value::structure(StructureData::new("Account", fields)))
}

/// Encodes the `storage` field of a (possibly mutated) `Account` value
/// back to its blob. Errors if `account` isn't the shape `main` was
/// given — the checker already guarantees it is.
pub fn save_account(host: &dyn HostCallbacks, address: &[u8], account: &Value) -> Result<(), ScriptError> {
    let Value::Structure(cell) = account else {
        return Err(ScriptError::entry_shape("main's Account argument was not returned as a Structure"));
    };
    let data = cell.borrow();
    let storage = data
        .fields
        .get("storage")
        .ok_or_else(|| ScriptError::entry_shape("Account value has no `storage` field"))?;
    let bytes = persistence::save(storage).map_err(|e| ScriptError::decode(e.to_string()))?;
    host.set_value(address, &[], STORAGE_KEY, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TestHost;

    #[test]
    fn an_account_with_no_prior_storage_loads_an_empty_dictionary() {
        let host = TestHost::new(vec![b"a".to_vec()]);
        let account = load_account(&host, b"a").unwrap();
        if let Value::Structure(cell) = &account {
            assert_eq!(cell.borrow().fields.get("storage"), Some(&Value::dictionary(HashMap::new())));
        } else {
            panic!("expected a structure");
        }
    }

    #[test]
    fn saved_storage_round_trips_through_a_fresh_load() {
        let host = TestHost::new(vec![b"a".to_vec()]);
        let mut fields = HashMap::new();
        let mut storage = HashMap::new();
        storage.insert("k".to_string(), Value::UInt64(7));
        fields.insert("address".to_string(), Value::String(hex::encode(b"a")));
        fields.insert("storage".to_string(), Value::dictionary(storage));
        let account = Value::structure(StructureData::new("Account", fields));

        save_account(&host, b"a", &account).unwrap();
        let reloaded = load_account(&host, b"a").unwrap();
        if let Value::Structure(cell) = &reloaded {
            let storage = cell.borrow().fields.get("storage").unwrap().clone();
            if let Value::Dictionary(d) = storage {
                assert_eq!(d.borrow().get("k"), Some(&Value::UInt64(7)));
            } else {
                panic!("expected a dictionary");
            }
        } else {
            panic!("expected a structure");
        }
    }
}
