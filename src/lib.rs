#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
//! Subject-oriented test cases
//!
//! `subcase` lets a test class declare its *subject* (the code under test) once and have each test method state
//! only the arguments the subject receives and what it should produce:
//!
//! ```rust
//! use subcase::prelude::*;
//!
//! #[derive(Default)]
//! struct TestAdd;
//!
//! impl Subject for TestAdd {
//!     fn signature(&self) -> Signature {
//!         Signature::new().param("a").param("b")
//!     }
//!
//!     fn call(&mut self, args: BoundCall) -> Result<Value, Exception> {
//!         ops::add(args.get("a")?, args.get("b")?)
//!     }
//! }
//!
//! #[subject_case]
//! impl TestAdd {
//!     #[args(a = 2, b = -6)]
//!     fn test_int_plus_int(case: &mut Case<Self>) -> CaseResult {
//!         case.assert_result(-4)
//!     }
//!
//!     #[args(a = (), b = 2)]
//!     fn test_none_plus_int(case: &mut Case<Self>) -> CaseResult {
//!         case.assert_result_raises(ExceptionKind::TypeError).map(|_| ())
//!     }
//! }
//!
//! subcase::host::assert_suite_passes::<TestAdd>();
//! ```
//!
//! ## Layout
//!
//! - [`binder`]: declared argument sets (`#[args]`, [`args!`]) and their side-table.
//! - [`case`]: the per-test engine: binding, the memoized subject call, value-isolated accessors.
//! - [`classify`]: turns signature mismatches into actionable [`BindingError`]s.
//! - the `assert_result*` family on [`Case`], delegating to [`host::asserts`].
//! - [`host`]: unittest-shaped assertions and a suite runner.
//!
//! ## Panic Policy
//!
//! - **Library code**: failures are `Result<_, CaseError>` and propagate with `?`; `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - [`host::assert_suite_passes`] panics on purpose: it is the bridge into a libtest `#[test]`.

extern crate self as subcase;

mod assertions;
pub mod binder;
pub mod case;
pub mod classify;
pub mod error;
pub mod host;

pub use subcase_core::{Args, BoundCall, Exception, ExceptionKind, Object, Param, Signature, TypeTag, Value, ops};
pub use subcase_derive::{IntoValue, subject_case};

pub use binder::{ArgsTable, Suite, TestFn, TestMethod, TestSuite};
pub use case::{Case, Subject};
pub use error::{AssertionFailure, BindingError, CaseError, CaseResult, UsageError};
pub use host::Tolerance;

/// Everything a test module needs.
pub mod prelude {
    pub use crate::args;
    pub use crate::host::{AssertResultExt, Tolerance};
    pub use crate::{
        Args, BoundCall, Case, CaseError, CaseResult, Exception, ExceptionKind, IntoValue, Object, Signature, Subject,
        TypeTag, Value, ops, subject_case,
    };
}
