//! Result-assertion family.
//!
//! Every method obtains the subject's outcome through [`Case::result`] (so the subject runs at most once per test)
//! and hands it to the matching [`host::asserts`](crate::host::asserts) primitive. A failure of `result()` itself
//! propagates unchanged, except in the `raises` variants which exist to inspect it.

use std::sync::Arc;

use subcase_core::{Exception, ExceptionKind, TypeTag, Value};

use crate::case::{Case, Subject};
use crate::error::CaseResult;
use crate::host::asserts::{self, Tolerance};

impl<S: Subject> Case<S> {
    /// Fail if the result is unequal to `expected` as determined by `==`.
    pub fn assert_result(&mut self, expected: impl Into<Value>) -> CaseResult {
        asserts::assert_equal(&self.result()?, &expected.into())
    }

    /// Fail if the result is equal to `unexpected` as determined by `==`.
    pub fn assert_result_not(&mut self, unexpected: impl Into<Value>) -> CaseResult {
        asserts::assert_not_equal(&self.result()?, &unexpected.into())
    }

    pub fn assert_result_true(&mut self) -> CaseResult {
        asserts::assert_true(&self.result()?)
    }

    pub fn assert_result_false(&mut self) -> CaseResult {
        asserts::assert_false(&self.result()?)
    }

    /// Like `assert_result_true(result is value)`, with a nicer message.
    ///
    /// Only `None`, booleans and objects can be identical; see [`Value::is`].
    pub fn assert_result_is(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_is(&self.result()?, &value.into())
    }

    pub fn assert_result_is_not(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_is_not(&self.result()?, &value.into())
    }

    /// Fail unless the result is a member of `container`.
    pub fn assert_result_in(&mut self, container: impl Into<Value>) -> CaseResult {
        asserts::assert_in(&self.result()?, &container.into())
    }

    pub fn assert_result_not_in(&mut self, container: impl Into<Value>) -> CaseResult {
        asserts::assert_not_in(&self.result()?, &container.into())
    }

    pub fn assert_result_is_instance(&mut self, tag: TypeTag) -> CaseResult {
        asserts::assert_is_instance(&self.result()?, &tag)
    }

    pub fn assert_result_is_not_instance(&mut self, tag: TypeTag) -> CaseResult {
        asserts::assert_not_is_instance(&self.result()?, &tag)
    }

    /// Fail unless the subject raised `kind` (or a subclass of it), and return the raised exception.
    ///
    /// An exception of another kind is not caught: the test errors, exactly as for an unexpected exception.
    pub fn assert_result_raises(&mut self, kind: ExceptionKind) -> CaseResult<Arc<Exception>> {
        asserts::assert_raises(&kind, self.result())
    }

    /// Like [`Case::assert_result_raises`], and the exception text must match `pattern`.
    pub fn assert_result_raises_regex(&mut self, kind: ExceptionKind, pattern: &str) -> CaseResult<Arc<Exception>> {
        asserts::assert_raises_regex(&kind, pattern, self.result())
    }

    /// Fail if the subject raised anything at all.
    pub fn assert_result_not_raises(&mut self) -> CaseResult {
        asserts::assert_not_raises(self.result()).map(|_| ())
    }

    /// Fail unless the result equals `expected` to 7 decimal places.
    pub fn assert_result_almost(&mut self, expected: impl Into<Value>) -> CaseResult {
        self.assert_result_almost_with(expected, Tolerance::default())
    }

    pub fn assert_result_almost_with(&mut self, expected: impl Into<Value>, tolerance: Tolerance) -> CaseResult {
        asserts::assert_almost_equal(&self.result()?, &expected.into(), tolerance)
    }

    /// Fail if the result equals `unexpected` to 7 decimal places.
    pub fn assert_result_not_almost(&mut self, unexpected: impl Into<Value>) -> CaseResult {
        self.assert_result_not_almost_with(unexpected, Tolerance::default())
    }

    pub fn assert_result_not_almost_with(&mut self, unexpected: impl Into<Value>, tolerance: Tolerance) -> CaseResult {
        asserts::assert_not_almost_equal(&self.result()?, &unexpected.into(), tolerance)
    }

    pub fn assert_result_greater(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_greater(&self.result()?, &value.into())
    }

    pub fn assert_result_greater_equal(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_greater_equal(&self.result()?, &value.into())
    }

    pub fn assert_result_less(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_less(&self.result()?, &value.into())
    }

    pub fn assert_result_less_equal(&mut self, value: impl Into<Value>) -> CaseResult {
        asserts::assert_less_equal(&self.result()?, &value.into())
    }

    /// Fail unless `pattern` matches somewhere in the (string) result.
    pub fn assert_result_regex(&mut self, pattern: &str) -> CaseResult {
        asserts::assert_regex(&self.result()?, pattern)
    }

    pub fn assert_result_not_regex(&mut self, pattern: &str) -> CaseResult {
        asserts::assert_not_regex(&self.result()?, pattern)
    }

    /// Assert that the result has the same elements as `iterable`, regardless of order.
    pub fn assert_result_count(&mut self, iterable: impl Into<Value>) -> CaseResult {
        asserts::assert_count_equal(&self.result()?, &iterable.into())
    }

    pub fn assert_result_sequence(&mut self, sequence: impl Into<Value>) -> CaseResult {
        asserts::assert_sequence_equal(&self.result()?, &sequence.into())
    }

    pub fn assert_result_list(&mut self, list: impl Into<Value>) -> CaseResult {
        asserts::assert_list_equal(&self.result()?, &list.into())
    }

    pub fn assert_result_tuple(&mut self, tuple: impl Into<Value>) -> CaseResult {
        asserts::assert_tuple_equal(&self.result()?, &tuple.into())
    }

    pub fn assert_result_set(&mut self, set: impl Into<Value>) -> CaseResult {
        asserts::assert_set_equal(&self.result()?, &set.into())
    }

    pub fn assert_result_dict(&mut self, dict: impl Into<Value>) -> CaseResult {
        asserts::assert_dict_equal(&self.result()?, &dict.into())
    }
}
