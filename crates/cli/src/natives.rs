//! Wraps a [`HostCallbacks`] implementation as the six script-exposed
//! native functions §6 names (`log`, `getValue`, `setValue`,
//! `createAccount`, `updateAccountCode`, `getAccount`), each a
//! [`NativeFunction`] sharing the evaluator's [`FaultCell`].

use std::collections::HashMap;
use std::rc::Rc;

use glyph_core::ScriptError;
use glyph_eval::{FaultCell, NativeFunction};
use glyph_runtime::{persistence, Callable, StructureData, Value};

use crate::host::HostCallbacks;

const STORAGE_KEY: &[u8] = b"storage";

fn expect_string(value: Value) -> Result<String, ScriptError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ScriptError::host(format!("expected String, got {}", other.type_name()))),
    }
}

fn expect_byte_array(value: Value) -> Result<Vec<u8>, ScriptError> {
    let Value::Array(cell) = value else {
        return Err(ScriptError::host(format!("expected Array<UInt8>, got {}", value.type_name())));
    };
    cell.borrow()
        .iter()
        .map(|v| match v {
            Value::UInt8(b) => Ok(*b),
            other => Err(ScriptError::host(format!("expected UInt8 element, got {}", other.type_name()))),
        })
        .collect()
}

fn expect_uint64(value: Value) -> Result<u64, ScriptError> {
    match value {
        Value::UInt64(n) => Ok(n),
        other => Err(ScriptError::host(format!("expected UInt64, got {}", other.type_name()))),
    }
}

fn decode_address(hex_str: &str) -> Result<Vec<u8>, ScriptError> {
    hex::decode(hex_str).map_err(|e| ScriptError::host(format!("invalid hex address `{hex_str}`: {e}")))
}

/// Builds the global table the evaluator is constructed with. `host` is
/// shared with nothing else — each script run gets its own.
pub fn build<H: HostCallbacks + 'static>(host: Rc<H>, fault: FaultCell) -> HashMap<String, Rc<dyn Callable>> {
    let mut natives: HashMap<String, Rc<dyn Callable>> = HashMap::new();

    {
        let host = host.clone();
        natives.insert(
            "log".to_string(),
            Rc::new(NativeFunction::new("log", 1, fault.clone(), move |mut args| {
                let message = expect_string(args.remove(0))?;
                host.log(&message);
                Ok(Value::Void)
            })),
        );
    }

    {
        let host = host.clone();
        natives.insert(
            "getValue".to_string(),
            Rc::new(NativeFunction::new("getValue", 3, fault.clone(), move |mut args| {
                let key = expect_string(args.remove(2))?;
                let controller = decode_address(&expect_string(args.remove(1))?)?;
                let owner = decode_address(&expect_string(args.remove(0))?)?;
                let bytes = host.get_value(&owner, &controller, key.as_bytes())?;
                let mut buf = [0u8; 8];
                let start = buf.len().saturating_sub(bytes.len());
                if bytes.len() > buf.len() {
                    return Err(ScriptError::host("stored value does not fit in UInt64"));
                }
                buf[start..].copy_from_slice(&bytes);
                Ok(Value::UInt64(u64::from_be_bytes(buf)))
            })),
        );
    }

    {
        let host = host.clone();
        natives.insert(
            "setValue".to_string(),
            Rc::new(NativeFunction::new("setValue", 4, fault.clone(), move |mut args| {
                let value = expect_uint64(args.remove(3))?;
                let key = expect_string(args.remove(2))?;
                let controller = decode_address(&expect_string(args.remove(1))?)?;
                let owner = decode_address(&expect_string(args.remove(0))?)?;
                host.set_value(&owner, &controller, key.as_bytes(), &value.to_be_bytes())?;
                Ok(Value::Void)
            })),
        );
    }

    {
        let host = host.clone();
        natives.insert(
            "createAccount".to_string(),
            Rc::new(NativeFunction::new("createAccount", 2, fault.clone(), move |mut args| {
                let code = expect_byte_array(args.remove(1))?;
                let public_key = expect_byte_array(args.remove(0))?;
                let address = host.create_account(&public_key, &code)?;
                Ok(Value::String(hex::encode(address)))
            })),
        );
    }

    {
        let host = host.clone();
        natives.insert(
            "updateAccountCode".to_string(),
            Rc::new(NativeFunction::new("updateAccountCode", 2, fault.clone(), move |mut args| {
                let code = expect_byte_array(args.remove(1))?;
                let address = decode_address(&expect_string(args.remove(0))?)?;
                host.update_account_code(&address, &code)?;
                Ok(Value::Void)
            })),
        );
    }

    {
        natives.insert(
            "getAccount".to_string(),
            Rc::new(NativeFunction::new("getAccount", 1, fault, move |mut args| {
                let address_hex = expect_string(args.remove(0))?;
                let address = decode_address(&address_hex)?;
                let bytes = host.get_value(&address, &[], STORAGE_KEY)?;
                let storage = if bytes.is_empty() {
                    Value::dictionary(HashMap::new())
                } else {
                    persistence::load(&bytes).map_err(|e| ScriptError::host(e.to_string()))?
                };
                let mut fields = HashMap::new();
                fields.insert("address".to_string(), Value::String(address_hex));
                fields.insert("storage".to_string(), storage);
                Ok(Value::structure(StructureData::new("Account", fields)))
            })),
        );
    }

    natives
}
