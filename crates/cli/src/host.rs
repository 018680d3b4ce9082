//! The host callback surface (§6): one method per row of the table,
//! so a real chain node, an in-memory test double, and this crate's
//! filesystem-backed reference host can all drive the same evaluator.

use glyph_core::ScriptError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

pub trait HostCallbacks {
    fn resolve_import(&self, reference: &str) -> Result<Vec<u8>, ScriptError>;
    fn get_value(&self, owner: &[u8], controller: &[u8], key: &[u8]) -> Result<Vec<u8>, ScriptError>;
    fn set_value(&self, owner: &[u8], controller: &[u8], key: &[u8], value: &[u8]) -> Result<(), ScriptError>;
    fn create_account(&self, public_key: &[u8], code: &[u8]) -> Result<Vec<u8>, ScriptError>;
    fn update_account_code(&self, address: &[u8], code: &[u8]) -> Result<(), ScriptError>;
    fn signing_accounts(&self) -> Vec<Vec<u8>>;
    fn log(&self, message: &str);
}

/// Reference implementation: every blob lives as one file under
/// `base_dir`, named by the (owner, controller, key) triple (§6's
/// persistence layout). Accounts are addressed by an incrementing
/// counter rather than a real key-derivation scheme — this crate has no
/// signature verification to ground one in.
pub struct LocalHost {
    base_dir: PathBuf,
    signing_accounts: Vec<Vec<u8>>,
    next_account: RefCell<u64>,
}

impl LocalHost {
    pub fn new(base_dir: PathBuf, signing_accounts: Vec<Vec<u8>>) -> Self {
        LocalHost { base_dir, signing_accounts, next_account: RefCell::new(1) }
    }

    fn blob_path(&self, owner: &[u8], controller: &[u8], key: &[u8]) -> PathBuf {
        let name = format!(
            "{}_{}_{}.blob",
            hex::encode(owner),
            hex::encode(controller),
            hex::encode(key)
        );
        self.base_dir.join(name)
    }
}

impl HostCallbacks for LocalHost {
    fn resolve_import(&self, reference: &str) -> Result<Vec<u8>, ScriptError> {
        Err(ScriptError::bridge_unsupported(format!(
            "import resolution is not supported by the reference host (requested `{reference}`)"
        )))
    }

    fn get_value(&self, owner: &[u8], controller: &[u8], key: &[u8]) -> Result<Vec<u8>, ScriptError> {
        let path = self.blob_path(owner, controller, key);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ScriptError::host(format!("reading {}: {e}", path.display()))),
        }
    }

    fn set_value(&self, owner: &[u8], controller: &[u8], key: &[u8], value: &[u8]) -> Result<(), ScriptError> {
        let path = self.blob_path(owner, controller, key);
        fs::create_dir_all(&self.base_dir)
            .map_err(|e| ScriptError::host(format!("creating {}: {e}", self.base_dir.display())))?;
        fs::write(&path, value).map_err(|e| ScriptError::host(format!("writing {}: {e}", path.display())))
    }

    fn create_account(&self, _public_key: &[u8], code: &[u8]) -> Result<Vec<u8>, ScriptError> {
        let mut counter = self.next_account.borrow_mut();
        let address = counter.to_be_bytes().to_vec();
        *counter += 1;
        self.update_account_code(&address, code)?;
        Ok(address)
    }

    fn update_account_code(&self, address: &[u8], code: &[u8]) -> Result<(), ScriptError> {
        self.set_value(address, &[], b"code", code)
    }

    fn signing_accounts(&self) -> Vec<Vec<u8>> {
        self.signing_accounts.clone()
    }

    fn log(&self, message: &str) {
        tracing::info!(target: "glyph::script", "{message}");
    }
}

/// An in-memory double for tests: every blob lives in a `HashMap` rather
/// than on disk, and `log` calls are recorded instead of printed.
#[derive(Default)]
pub struct TestHost {
    blobs: RefCell<HashMap<(Vec<u8>, Vec<u8>, Vec<u8>), Vec<u8>>>,
    signing_accounts: Vec<Vec<u8>>,
    next_account: RefCell<u64>,
    pub logs: Rc<RefCell<Vec<String>>>,
}

impl TestHost {
    pub fn new(signing_accounts: Vec<Vec<u8>>) -> Self {
        TestHost { signing_accounts, ..Default::default() }
    }
}

impl HostCallbacks for TestHost {
    fn resolve_import(&self, reference: &str) -> Result<Vec<u8>, ScriptError> {
        Err(ScriptError::bridge_unsupported(format!("import `{reference}` is not supported")))
    }

    fn get_value(&self, owner: &[u8], controller: &[u8], key: &[u8]) -> Result<Vec<u8>, ScriptError> {
        Ok(self
            .blobs
            .borrow()
            .get(&(owner.to_vec(), controller.to_vec(), key.to_vec()))
            .cloned()
            .unwrap_or_default())
    }

    fn set_value(&self, owner: &[u8], controller: &[u8], key: &[u8], value: &[u8]) -> Result<(), ScriptError> {
        self.blobs
            .borrow_mut()
            .insert((owner.to_vec(), controller.to_vec(), key.to_vec()), value.to_vec());
        Ok(())
    }

    fn create_account(&self, _public_key: &[u8], code: &[u8]) -> Result<Vec<u8>, ScriptError> {
        let mut counter = self.next_account.borrow_mut();
        let address = counter.to_be_bytes().to_vec();
        *counter += 1;
        self.update_account_code(&address, code)?;
        Ok(address)
    }

    fn update_account_code(&self, address: &[u8], code: &[u8]) -> Result<(), ScriptError> {
        self.set_value(address, &[], b"code", code)
    }

    fn signing_accounts(&self) -> Vec<Vec<u8>> {
        self.signing_accounts.clone()
    }

    fn log(&self, message: &str) {
        self.logs.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_host_round_trips_a_blob_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path().to_path_buf(), vec![]);
        host.set_value(b"owner", b"", b"storage", b"hello").unwrap();
        assert_eq!(host.get_value(b"owner", b"", b"storage").unwrap(), b"hello");
    }

    #[test]
    fn local_host_returns_empty_bytes_for_an_unset_key() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path().to_path_buf(), vec![]);
        assert_eq!(host.get_value(b"nobody", b"", b"storage").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_host_records_log_calls() {
        let host = TestHost::new(vec![]);
        host.log("hello");
        assert_eq!(&*host.logs.borrow(), &["hello".to_string()]);
    }
}
