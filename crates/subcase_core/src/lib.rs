//! Provide the pure semantic core shared by the `subcase` engine and its host assertions.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers for:
//! - the dynamic value model that subjects receive and return ([`value`]),
//! - Python-like operators over those values ([`ops`]),
//! - the exception taxonomy subjects raise ([`errors`]),
//! - declared argument sets and Python-style parameter binding ([`args`], [`signature`]).
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no logging, and no global state.
//! - User-facing message text (e.g. `subject() missing 1 required positional argument: 'b'`) is produced here so the
//!   engine's binding-error classifier and the tests agree on a single spelling.

#![deny(clippy::unwrap_used)]

pub mod args;
pub mod errors;
pub mod ops;
pub mod signature;
pub mod value;

pub use args::Args;
pub use errors::{Exception, ExceptionKind};
pub use signature::{BoundCall, Param, Signature};
pub use value::{Object, TypeTag, Value};
