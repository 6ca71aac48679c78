//! Error taxonomy for test cases.
//!
//! Everything a test method can run into surfaces as a [`CaseError`]:
//! - [`CaseError::Raised`]: the subject failed. This is the behavior under test and is propagated verbatim, so
//!   "raises X" assertions see the original exception kind and instance.
//! - [`CaseError::Binding`]: the declared `#[args]` don't fit the subject's signature (a test-authoring mistake).
//! - [`CaseError::Usage`]: the engine was driven out of order (e.g. `cached_result` before any call).
//! - [`CaseError::Assertion`]: a host assertion did not hold. This is the only kind a runner reports as a *failure*;
//!   the others are *errors*.
//! - [`CaseError::Panicked`]: the test body panicked (e.g. a plain `assert_eq!`); the runner caught it.

use std::sync::Arc;

use miette::Diagnostic;
use subcase_core::Exception;
use thiserror::Error;

/// Result type returned by test methods and assertions.
pub type CaseResult<T = ()> = Result<T, CaseError>;

/// Errors raised while running a test method.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CaseError {
    /// A failure raised by the subject, kept as the same shared instance on every re-raise.
    #[error("{}", .0.describe())]
    #[diagnostic(code(subcase::raised))]
    Raised(Arc<Exception>),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Assertion(#[from] AssertionFailure),

    /// The test body panicked; carries the panic message.
    #[error("test panicked: {0}")]
    #[diagnostic(code(subcase::panicked))]
    Panicked(String),
}

impl CaseError {
    /// Return the subject's exception when this is a [`CaseError::Raised`].
    pub fn exception(&self) -> Option<&Arc<Exception>> {
        match self {
            CaseError::Raised(exc) => Some(exc),
            _ => None,
        }
    }

    /// Whether a runner should count this as a failed assertion rather than an error.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, CaseError::Assertion(_))
    }
}

impl From<Exception> for CaseError {
    fn from(exc: Exception) -> Self {
        CaseError::Raised(Arc::new(exc))
    }
}

/// The declared arguments do not match the subject's parameters.
///
/// Produced by the binding-error classifier from the `TypeError` a mismatched call raises; the original exception is
/// kept as the error source.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(subcase::binding),
    help("compare the test method's `#[args(...)]` with the parameters in `Subject::signature`")
)]
pub struct BindingError {
    message: String,
    #[source]
    cause: Arc<Exception>,
}

impl BindingError {
    pub fn new(message: impl Into<String>, cause: Arc<Exception>) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `TypeError` that was classified as a binding error.
    pub fn cause(&self) -> &Arc<Exception> {
        &self.cause
    }
}

/// The engine was used out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum UsageError {
    #[error("Cannot call 'cached_result' before calling 'result'")]
    #[diagnostic(code(subcase::usage::no_result_yet))]
    NoResultYet,

    #[error("Cannot call '{operation}' outside a test method: no arguments are bound")]
    #[diagnostic(
        code(subcase::usage::not_bound),
        help("run test methods through their `Suite` so the declared arguments get bound")
    )]
    NotBound { operation: &'static str },
}

/// A host assertion did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(subcase::assertion))]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Append a user note the way unittest's `longMessage` does (`standard : note`).
    pub fn with_note(self, note: impl AsRef<str>) -> Self {
        Self {
            message: format!("{} : {}", self.message, note.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subcase_core::ExceptionKind;

    #[test]
    fn test_raised_displays_like_a_traceback_tail() {
        let err = CaseError::from(Exception::type_error("boom"));
        assert_eq!(err.to_string(), "TypeError: boom");
        assert!(!err.is_assertion_failure());
        assert_eq!(err.exception().map(|e| e.kind().clone()), Some(ExceptionKind::TypeError));
    }

    #[test]
    fn test_bare_exception_displays_kind_only() {
        let err = CaseError::from(Exception::bare(ExceptionKind::ValueError));
        assert_eq!(err.to_string(), "ValueError");
    }

    #[test]
    fn test_binding_error_keeps_cause() {
        let cause = Arc::new(Exception::type_error("subject() got an unexpected keyword argument 'c'"));
        let err = BindingError::new("Subject received an unexpected keyword argument 'c'", Arc::clone(&cause));
        assert!(Arc::ptr_eq(err.cause(), &cause));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_assertion_note() {
        let failure = AssertionFailure::new("1 != 2").with_note("totals");
        assert_eq!(failure.message(), "1 != 2 : totals");
        assert!(CaseError::from(failure).is_assertion_failure());
    }

    #[test]
    fn test_panicked_is_an_error_not_a_failure() {
        let err = CaseError::Panicked("boom".to_string());
        assert_eq!(err.to_string(), "test panicked: boom");
        assert!(!err.is_assertion_failure());
        assert!(err.exception().is_none());
    }

    #[test]
    fn test_usage_messages() {
        assert_eq!(
            UsageError::NoResultYet.to_string(),
            "Cannot call 'cached_result' before calling 'result'"
        );
        assert_eq!(
            UsageError::NotBound { operation: "result" }.to_string(),
            "Cannot call 'result' outside a test method: no arguments are bound"
        );
    }
}
