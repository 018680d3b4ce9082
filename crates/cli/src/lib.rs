//! Library half of the reference runner: the host callback surface,
//! the native-function bridge, and entry-contract storage plumbing.
//! `src/main.rs` is the thin `glyphc` CLI built on top of these.

pub mod entry;
pub mod host;
pub mod natives;
pub mod storage;
