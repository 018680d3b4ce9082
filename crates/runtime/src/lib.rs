//! The Value domain: the closed set of runtime values the evaluator
//! produces, the Integer capability, member/index protocols, the host
//! bridge, and the persistence codec.
//!
//! This crate has no notion of an AST or an environment; `glyph-compiler`
//! and `glyph-eval` build on top of it through the [`callable::Callable`]
//! seam so that neither the checker nor the evaluator's control-flow
//! machinery leaks into the value representation itself.

pub mod bridge;
pub mod callable;
pub mod integer;
pub mod member;
pub mod persistence;
pub mod types;
pub mod value;

pub use bridge::{to_host, to_value, to_values, BridgeUnsupported, HostValue};
pub use callable::{BoundMethod, Callable, FunctionRegistry, StructFunctionTable};
pub use integer::IntegerFault;
pub use member::{get_member, index_get, index_get_storage, index_set, set_member, MemberFault};
pub use persistence::{load, save, PersistError, PersistedValue};
pub use types::TypeTag;
pub use value::{StructureData, Value};
