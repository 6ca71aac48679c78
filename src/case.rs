//! Subject Invocation Engine.
//!
//! A [`Case`] is one test instance: it owns a fresh fixture (the user's [`Subject`] type) and the state of a single
//! test invocation. The lifecycle is:
//!
//! ```text
//! Unbound --bind--> Bound { outcome: None } --first result()--> Bound { outcome: Some(value | failure) }
//!    ^                                                                   |
//!    +------------------------------- unbind ----------------------------+
//! ```
//!
//! ## Invariants
//! - Within one binding the subject is called at most once; every later `result()` observes the cached outcome.
//! - Values handed out (arguments, results) are deep copies. Mutating them never reaches the stored arguments or the
//!   cached outcome.
//! - A failure outcome is re-raised as the same shared instance every time.

use std::ops::{Deref, DerefMut};

use subcase_core::{Args, BoundCall, Exception, Signature, Value};

use crate::binder::{ArgsTable, TestMethod};
use crate::classify;
use crate::error::{CaseError, CaseResult, UsageError};

/// The code under test, declared once per test class.
///
/// Implementors describe the subject's parameters with [`Subject::signature`] and perform the call in
/// [`Subject::call`]. The engine binds each test method's declared arguments onto the signature and calls the subject
/// at most once per test.
///
/// # Examples
///
/// ```rust
/// use subcase::{BoundCall, Exception, Signature, Subject, Value, ops};
///
/// #[derive(Default)]
/// struct TestAdd;
///
/// impl Subject for TestAdd {
///     fn signature(&self) -> Signature {
///         Signature::new().param("a").param("b")
///     }
///
///     fn call(&mut self, args: BoundCall) -> Result<Value, Exception> {
///         ops::add(args.get("a")?, args.get("b")?)
///     }
/// }
/// ```
pub trait Subject {
    /// Parameters the subject accepts.
    fn signature(&self) -> Signature;

    /// Invoke the subject with bound arguments.
    fn call(&mut self, args: BoundCall) -> Result<Value, Exception>;

    /// Per-test setup, run on the fresh fixture before the test method.
    fn set_up(&mut self) -> CaseResult {
        Ok(())
    }

    /// Per-test cleanup, run after the test method (also when it failed).
    fn tear_down(&mut self) -> CaseResult {
        Ok(())
    }
}

type Outcome = Result<Value, CaseError>;

#[derive(Debug)]
enum Phase {
    Unbound,
    Bound { args: Args, outcome: Option<Outcome> },
}

/// One test instance: a fixture plus the bound arguments and memoized subject outcome of the running test.
///
/// `Case` dereferences to the fixture, so test methods reach their own state with `case.field`.
#[derive(Debug)]
pub struct Case<S> {
    fixture: S,
    phase: Phase,
}

impl<S> Case<S> {
    /// Wrap a fresh fixture; nothing is bound yet.
    pub fn new(fixture: S) -> Self {
        Self {
            fixture,
            phase: Phase::Unbound,
        }
    }

    pub fn fixture(&self) -> &S {
        &self.fixture
    }

    pub fn fixture_mut(&mut self) -> &mut S {
        &mut self.fixture
    }

    pub fn into_fixture(self) -> S {
        self.fixture
    }

    /// Bind the arguments for a new test invocation, discarding any earlier outcome.
    pub fn bind(&mut self, args: Args) {
        tracing::debug!(args = %args.describe(), "binding subject arguments");
        self.phase = Phase::Bound { args, outcome: None };
    }

    /// End the invocation: drop the bound arguments and the cached outcome.
    pub fn unbind(&mut self) {
        tracing::debug!("unbinding subject arguments");
        self.phase = Phase::Unbound;
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.phase, Phase::Bound { .. })
    }

    /// Whether the subject has already been called in this invocation.
    pub fn has_result(&self) -> bool {
        matches!(self.phase, Phase::Bound { outcome: Some(_), .. })
    }

    /// Return a deep copy of the bound arguments.
    ///
    /// ## Errors
    /// - [`UsageError::NotBound`] outside a test invocation.
    pub fn bound_args(&self) -> CaseResult<Args> {
        Ok(self.bound("bound_args")?.deep_clone())
    }

    /// Return a deep copy of the bound positional values.
    pub fn args(&self) -> CaseResult<Vec<Value>> {
        Ok(self.bound("args")?.positional())
    }

    /// Return a deep copy of the bound keyword values.
    pub fn kwargs(&self) -> CaseResult<Vec<(String, Value)>> {
        Ok(self.bound("kwargs")?.keywords())
    }

    /// Return a deep copy of the cached outcome without calling the subject.
    ///
    /// ## Errors
    /// - [`UsageError::NoResultYet`] if the subject has not been called in this invocation.
    /// - The stored failure (same instance as `result()` raised) if the subject failed.
    pub fn cached_result(&self) -> CaseResult<Value> {
        match &self.phase {
            Phase::Bound {
                outcome: Some(outcome), ..
            } => isolate(outcome),
            _ => Err(UsageError::NoResultYet.into()),
        }
    }

    fn bound(&self, operation: &'static str) -> CaseResult<&Args> {
        match &self.phase {
            Phase::Bound { args, .. } => Ok(args),
            Phase::Unbound => Err(UsageError::NotBound { operation }.into()),
        }
    }
}

impl<S: Subject> Case<S> {
    /// Return the subject's outcome, calling it on first use.
    ///
    /// The first call binds a deep copy of the declared arguments onto [`Subject::signature`] and invokes
    /// [`Subject::call`]; binding mismatches are reported as [`CaseError::Binding`], any other failure as
    /// [`CaseError::Raised`]. Later calls return a copy of the cached value or re-raise the cached failure.
    ///
    /// ## Errors
    /// - [`UsageError::NotBound`] outside a test invocation.
    pub fn result(&mut self) -> CaseResult<Value> {
        let Phase::Bound { args, outcome } = &mut self.phase else {
            return Err(UsageError::NotBound { operation: "result" }.into());
        };
        if let Some(cached) = outcome.as_ref() {
            tracing::debug!("returning cached subject outcome");
            return isolate(cached);
        }

        let signature = self.fixture.signature();
        tracing::debug!(subject = signature.name(), "invoking subject");
        let produced = signature
            .bind(&args.deep_clone())
            .and_then(|call| self.fixture.call(call))
            .map_err(|exc| classify::classify(exc, signature.name()));

        let returned = isolate(&produced);
        *outcome = Some(produced);
        returned
    }

    /// Run one test method body with its declared arguments bound.
    ///
    /// Looks up `method` in `table` (undecorated methods get an empty set), binds, runs the body and unbinds again
    /// whether or not the body succeeded.
    pub fn call_test_method(&mut self, method: &TestMethod<S>, table: &ArgsTable) -> CaseResult {
        self.bind(table.lookup(method.name()));
        let outcome = (method.body())(self);
        self.unbind();
        outcome
    }
}

fn isolate(outcome: &Outcome) -> Outcome {
    match outcome {
        Ok(value) => Ok(value.deep_clone()),
        Err(err) => Err(err.clone()),
    }
}

impl<S> Deref for Case<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.fixture
    }
}

impl<S> DerefMut for Case<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.fixture
    }
}
