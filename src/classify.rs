//! Binding-error classification.
//!
//! When the declared `#[args]` don't fit the subject's signature, the call fails with a `TypeError` whose text names
//! the subject (`subject() missing 2 required positional arguments: 'c' and 'd'`). This module recognizes those
//! messages and rewrites them into an actionable [`BindingError`].
//!
//! ## Notes
//! - Classification is a string heuristic over the exception message, not a structural check. It tracks the wording
//!   produced by `subcase_core::signature` and CPython, and breaks if that wording changes.
//! - It fails open: anything that does not match (other kinds, no message, a non-string first argument, unrelated
//!   text) stays a [`CaseError::Raised`] with the original exception untouched.

use std::sync::Arc;

use subcase_core::{Exception, ExceptionKind};

use crate::error::{BindingError, CaseError};

const WRONG_ARGS_HINT: &str = "Did you decorate a test method with the wrong 'args'?";
const MISSING_ARGS_HINT: &str = "Did you decorate all test methods with 'args'?";

/// Classify a failure raised while calling the subject named `subject_name`.
pub fn classify(exception: Exception, subject_name: &str) -> CaseError {
    match binding_message(&exception, subject_name) {
        Some(message) => {
            tracing::warn!(subject = subject_name, %message, "subject call failed to bind declared arguments");
            CaseError::Binding(BindingError::new(message, Arc::new(exception)))
        }
        None => CaseError::Raised(Arc::new(exception)),
    }
}

/// Return the rewritten binding-error message, or `None` if `exception` is not a binding failure.
pub fn binding_message(exception: &Exception, subject_name: &str) -> Option<String> {
    if exception.kind() != &ExceptionKind::TypeError {
        return None;
    }
    let message = exception.message()?;
    let detail = subject_detail(message, subject_name)?;

    if detail.starts_with("got an unexpected keyword argument") {
        let received = detail.strip_prefix("got ")?;
        Some(format!("Subject received {received}. {WRONG_ARGS_HINT}"))
    } else if detail.starts_with("missing") && detail.contains("required positional argument") {
        let misses = detail.strip_prefix("missing ")?;
        Some(format!("Subject misses {misses}. {MISSING_ARGS_HINT}"))
    } else if detail.starts_with("takes") && detail.contains("positional argument") {
        Some(format!("Subject {detail}. {WRONG_ARGS_HINT}"))
    } else if detail.starts_with("got multiple values for argument") {
        Some(format!("Subject {detail}. {WRONG_ARGS_HINT}"))
    } else {
        None
    }
}

/// The text after `"<subject_name>() "`, when the message starts with the subject's name, bare or qualified
/// (`TestAdd.subject() missing ...`). Callables whose names merely end in the subject's name don't count.
fn subject_detail<'a>(message: &'a str, subject_name: &str) -> Option<&'a str> {
    let callable = format!("{subject_name}() ");
    let start = message.find(&callable)?;
    let owner = &message[..start];
    let qualified = owner
        .strip_suffix('.')
        .is_some_and(|path| !path.is_empty() && !path.contains(char::is_whitespace));
    if !owner.is_empty() && !qualified {
        return None;
    }
    Some(&message[start + callable.len()..])
}
