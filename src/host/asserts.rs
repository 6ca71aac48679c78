//! Assertion primitives shaped after Python's `unittest.TestCase`.
//!
//! Each check returns `Ok(())` or a [`CaseError::Assertion`] whose message reads like the one unittest prints
//! (`-4 != 5`, `False is not true`, `Lists differ: ...`). Operations that unittest itself would let blow up
//! (comparing `str` with `int`, membership in a non-container, an invalid regex) raise the corresponding exception
//! instead, which a runner reports as an error rather than a failure.
//!
//! ## Notes
//! - The `ndiff` tail unittest appends to sequence and dict failures is not reproduced; the header lines are.

use std::sync::Arc;

use regex::Regex;
use subcase_core::ops::{self, CompareOp};
use subcase_core::value::{float_repr, str_repr};
use subcase_core::{Exception, ExceptionKind, TypeTag, Value};

use crate::error::{AssertionFailure, CaseError, CaseResult};

/// How close two numbers must be for [`assert_almost_equal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// The difference rounded to this many decimal places must be zero.
    Places(u32),
    /// The absolute difference must not exceed this value.
    Delta(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Places(7)
    }
}

/// Attach a user note to an assertion failure, as unittest's `msg=` does.
pub trait AssertResultExt {
    fn with_note(self, note: impl AsRef<str>) -> Self;
}

impl<T> AssertResultExt for CaseResult<T> {
    fn with_note(self, note: impl AsRef<str>) -> Self {
        self.map_err(|err| match err {
            CaseError::Assertion(failure) => CaseError::Assertion(failure.with_note(note)),
            other => other,
        })
    }
}

fn fail_with(message: impl Into<String>) -> CaseError {
    AssertionFailure::new(message).into()
}

/// Fail unconditionally.
pub fn fail(message: impl Into<String>) -> CaseResult {
    Err(fail_with(message))
}

// ============================================================================
// Equality and truth
// ============================================================================

/// `first == second`, dispatching to the type-specific check when both sides are the same container type.
pub fn assert_equal(first: &Value, second: &Value) -> CaseResult {
    match (first, second) {
        (Value::List(_), Value::List(_)) => assert_list_equal(first, second),
        (Value::Tuple(_), Value::Tuple(_)) => assert_tuple_equal(first, second),
        (Value::Set(_), Value::Set(_)) => assert_set_equal(first, second),
        (Value::Dict(_), Value::Dict(_)) => assert_dict_equal(first, second),
        _ if first == second => Ok(()),
        _ => fail(format!("{} != {}", first.repr(), second.repr())),
    }
}

pub fn assert_not_equal(first: &Value, second: &Value) -> CaseResult {
    if first != second {
        return Ok(());
    }
    fail(format!("{} == {}", first.repr(), second.repr()))
}

pub fn assert_true(value: &Value) -> CaseResult {
    if value.truthy() {
        return Ok(());
    }
    fail(format!("{} is not true", value.repr()))
}

pub fn assert_false(value: &Value) -> CaseResult {
    if !value.truthy() {
        return Ok(());
    }
    fail(format!("{} is not false", value.repr()))
}

// ============================================================================
// Identity, membership and type
// ============================================================================

pub fn assert_is(first: &Value, second: &Value) -> CaseResult {
    if first.is(second) {
        return Ok(());
    }
    fail(format!("{} is not {}", first.repr(), second.repr()))
}

pub fn assert_is_not(first: &Value, second: &Value) -> CaseResult {
    if !first.is(second) {
        return Ok(());
    }
    fail(format!("unexpectedly identical: {}", first.repr()))
}

/// `member in container`.
///
/// ## Errors
/// - `TypeError` when `container` does not support membership tests.
pub fn assert_in(member: &Value, container: &Value) -> CaseResult {
    if ops::contains(container, member)? {
        return Ok(());
    }
    fail(format!("{} not found in {}", member.repr(), container.repr()))
}

pub fn assert_not_in(member: &Value, container: &Value) -> CaseResult {
    if !ops::contains(container, member)? {
        return Ok(());
    }
    fail(format!("{} unexpectedly found in {}", member.repr(), container.repr()))
}

pub fn assert_is_instance(value: &Value, tag: &TypeTag) -> CaseResult {
    if value.is_instance(tag) {
        return Ok(());
    }
    fail(format!("{} is not an instance of {tag}", value.repr()))
}

pub fn assert_not_is_instance(value: &Value, tag: &TypeTag) -> CaseResult {
    if !value.is_instance(tag) {
        return Ok(());
    }
    fail(format!("{} is an instance of {tag}", value.repr()))
}

// ============================================================================
// Approximate equality and ordering
// ============================================================================

/// `abs(first - second)`; integer differences beyond `i64` are computed as floats.
fn abs_difference(first: &Value, second: &Value) -> Result<Value, Exception> {
    let difference = match ops::sub(first, second) {
        Err(err) if err.kind() == &ExceptionKind::OverflowError => match (first.as_float(), second.as_float()) {
            (Some(x), Some(y)) => Value::Float(x - y),
            _ => return Err(err),
        },
        other => other?,
    };
    Ok(match difference {
        Value::Int(i) => i.checked_abs().map_or(Value::Float((i as f64).abs()), Value::Int),
        Value::Float(f) => Value::Float(f.abs()),
        other => other,
    })
}

fn rounds_to_zero(difference: &Value, places: u32) -> bool {
    let diff = difference.as_float().unwrap_or(f64::NAN);
    let scale = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    (diff * scale).round_ties_even() == 0.0
}

/// Equal within `tolerance`: the difference rounded to `places` is zero, or is at most `delta`.
///
/// ## Errors
/// - `TypeError` when the values cannot be subtracted.
pub fn assert_almost_equal(first: &Value, second: &Value, tolerance: Tolerance) -> CaseResult {
    if first == second {
        return Ok(());
    }
    let difference = abs_difference(first, second)?;
    match tolerance {
        Tolerance::Places(places) => {
            if rounds_to_zero(&difference, places) {
                return Ok(());
            }
            fail(format!(
                "{} != {} within {places} places ({} difference)",
                first.repr(),
                second.repr(),
                difference.repr()
            ))
        }
        Tolerance::Delta(delta) => {
            if difference.as_float().is_some_and(|diff| diff <= delta) {
                return Ok(());
            }
            fail(format!(
                "{} != {} within {} delta ({} difference)",
                first.repr(),
                second.repr(),
                float_repr(delta),
                difference.repr()
            ))
        }
    }
}

pub fn assert_not_almost_equal(first: &Value, second: &Value, tolerance: Tolerance) -> CaseResult {
    if first == second {
        return fail(format!("{} == {}", first.repr(), second.repr()));
    }
    let difference = abs_difference(first, second)?;
    match tolerance {
        Tolerance::Places(places) => {
            if !rounds_to_zero(&difference, places) {
                return Ok(());
            }
            fail(format!("{} == {} within {places} places", first.repr(), second.repr()))
        }
        Tolerance::Delta(delta) => {
            if difference.as_float().is_some_and(|diff| diff > delta) {
                return Ok(());
            }
            fail(format!(
                "{} == {} within {} delta ({} difference)",
                first.repr(),
                second.repr(),
                float_repr(delta),
                difference.repr()
            ))
        }
    }
}

fn assert_ordered(first: &Value, second: &Value, op: CompareOp, phrase: &str) -> CaseResult {
    if ops::compare_op(first, second, op)? {
        return Ok(());
    }
    fail(format!("{} not {phrase} {}", first.repr(), second.repr()))
}

pub fn assert_greater(first: &Value, second: &Value) -> CaseResult {
    assert_ordered(first, second, CompareOp::Gt, "greater than")
}

pub fn assert_greater_equal(first: &Value, second: &Value) -> CaseResult {
    assert_ordered(first, second, CompareOp::GtEq, "greater than or equal to")
}

pub fn assert_less(first: &Value, second: &Value) -> CaseResult {
    assert_ordered(first, second, CompareOp::Lt, "less than")
}

pub fn assert_less_equal(first: &Value, second: &Value) -> CaseResult {
    assert_ordered(first, second, CompareOp::LtEq, "less than or equal to")
}

// ============================================================================
// Regular expressions
// ============================================================================

fn compile(pattern: &str) -> Result<Regex, Exception> {
    Regex::new(pattern).map_err(|err| Exception::new(ExceptionKind::from_name("re.error"), err.to_string()))
}

fn searched_text(text: &Value) -> Result<&str, Exception> {
    text.as_str().ok_or_else(|| {
        Exception::type_error(format!("expected string or bytes-like object, got '{}'", text.type_name()))
    })
}

/// `re.search(pattern, text)` finds a match.
///
/// ## Errors
/// - `TypeError` when `text` is not a string, `re.error` when `pattern` does not compile.
pub fn assert_regex(text: &Value, pattern: &str) -> CaseResult {
    let regex = compile(pattern)?;
    let haystack = searched_text(text)?;
    if regex.is_match(haystack) {
        return Ok(());
    }
    fail(format!(
        "Regex didn't match: {} not found in {}",
        str_repr(pattern),
        text.repr()
    ))
}

pub fn assert_not_regex(text: &Value, pattern: &str) -> CaseResult {
    let regex = compile(pattern)?;
    let haystack = searched_text(text)?;
    match regex.find(haystack) {
        None => Ok(()),
        Some(found) => fail(format!(
            "Regex matched: {} matches {} in {}",
            str_repr(found.as_str()),
            str_repr(pattern),
            text.repr()
        )),
    }
}

// ============================================================================
// Containers
// ============================================================================

fn iterable(value: &Value) -> Result<Vec<Value>, Exception> {
    value
        .iterate()
        .ok_or_else(|| Exception::type_error(format!("'{}' object is not iterable", value.type_name())))
}

/// Same elements with the same multiplicities, regardless of order.
pub fn assert_count_equal(first: &Value, second: &Value) -> CaseResult {
    let first_items = iterable(first)?;
    let second_items = iterable(second)?;
    let count = |items: &[Value], elem: &Value| items.iter().filter(|item| *item == elem).count();

    let mut seen: Vec<&Value> = Vec::new();
    let mut mismatches = Vec::new();
    for elem in first_items.iter().chain(second_items.iter()) {
        if seen.contains(&elem) {
            continue;
        }
        seen.push(elem);
        let (in_first, in_second) = (count(&first_items, elem), count(&second_items, elem));
        if in_first != in_second {
            mismatches.push(format!("First has {in_first}, Second has {in_second}:  {}", elem.repr()));
        }
    }
    if mismatches.is_empty() {
        return Ok(());
    }
    fail(format!("Element counts were not equal:\n{}", mismatches.join("\n")))
}

fn sequence_items(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(items) | Value::Tuple(items) => Some(items.clone()),
        Value::Str(_) => value.iterate(),
        _ => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn check_sequence(first: &Value, second: &Value, seq_type: Option<&TypeTag>) -> CaseResult {
    let type_name = seq_type.map_or("sequence", TypeTag::name);
    if let Some(tag) = seq_type {
        if !first.is_instance(tag) {
            return fail(format!("First sequence is not a {type_name}: {}", first.repr()));
        }
        if !second.is_instance(tag) {
            return fail(format!("Second sequence is not a {type_name}: {}", second.repr()));
        }
    }
    let Some(first_items) = sequence_items(first) else {
        return fail("First sequence has no length.    Non-sequence?");
    };
    let Some(second_items) = sequence_items(second) else {
        return fail("Second sequence has no length.    Non-sequence?");
    };
    if first_items == second_items {
        return Ok(());
    }

    let mut message = format!(
        "{}s differ: {} != {}\n",
        capitalize(type_name),
        first.repr(),
        second.repr()
    );
    let differing = first_items
        .iter()
        .zip(&second_items)
        .position(|(a, b)| a != b);
    if let Some(index) = differing {
        message.push_str(&format!(
            "\nFirst differing element {index}:\n{}\n{}\n",
            first_items[index].repr(),
            second_items[index].repr()
        ));
    }
    let (len1, len2) = (first_items.len(), second_items.len());
    if len1 > len2 {
        message.push_str(&format!(
            "\nFirst {type_name} contains {} additional elements.\nFirst extra element {len2}:\n{}\n",
            len1 - len2,
            first_items[len2].repr()
        ));
    } else if len1 < len2 {
        message.push_str(&format!(
            "\nSecond {type_name} contains {} additional elements.\nFirst extra element {len1}:\n{}\n",
            len2 - len1,
            second_items[len1].repr()
        ));
    }
    fail(message.trim_end())
}

/// Element-wise equality of two sequences (lists, tuples or strings).
pub fn assert_sequence_equal(first: &Value, second: &Value) -> CaseResult {
    check_sequence(first, second, None)
}

pub fn assert_list_equal(first: &Value, second: &Value) -> CaseResult {
    check_sequence(first, second, Some(&TypeTag::List))
}

pub fn assert_tuple_equal(first: &Value, second: &Value) -> CaseResult {
    check_sequence(first, second, Some(&TypeTag::Tuple))
}

pub fn assert_set_equal(first: &Value, second: &Value) -> CaseResult {
    let (Value::Set(first_items), Value::Set(second_items)) = (first, second) else {
        let culprit = if matches!(first, Value::Set(_)) { second } else { first };
        let position = if matches!(first, Value::Set(_)) { "second" } else { "first" };
        return fail(format!(
            "{position} argument does not support set difference: '{}' object has no attribute 'difference'",
            culprit.type_name()
        ));
    };
    let only_first: Vec<&Value> = first_items.iter().filter(|v| !second_items.contains(v)).collect();
    let only_second: Vec<&Value> = second_items.iter().filter(|v| !first_items.contains(v)).collect();
    if only_first.is_empty() && only_second.is_empty() {
        return Ok(());
    }

    let mut lines = Vec::new();
    if !only_first.is_empty() {
        lines.push("Items in the first set but not the second:".to_string());
        lines.extend(only_first.iter().map(|v| v.repr()));
    }
    if !only_second.is_empty() {
        lines.push("Items in the second set but not the first:".to_string());
        lines.extend(only_second.iter().map(|v| v.repr()));
    }
    fail(lines.join("\n"))
}

pub fn assert_dict_equal(first: &Value, second: &Value) -> CaseResult {
    if !first.is_instance(&TypeTag::Dict) {
        return fail("First argument is not a dictionary");
    }
    if !second.is_instance(&TypeTag::Dict) {
        return fail("Second argument is not a dictionary");
    }
    if first == second {
        return Ok(());
    }
    fail(format!("{} != {}", first.repr(), second.repr()))
}

// ============================================================================
// Raised exceptions
// ============================================================================

/// Expect `outcome` to be a raised exception of `kind` (or a subclass) and return it.
///
/// ## Errors
/// - An assertion failure `"<Kind> not raised"` when `outcome` is a value.
/// - Any other error (an exception of an unrelated kind, binding and usage errors) is returned unchanged, so the test
///   errors instead of failing.
pub fn assert_raises(kind: &ExceptionKind, outcome: CaseResult<Value>) -> CaseResult<Arc<Exception>> {
    match outcome {
        Ok(_) => Err(fail_with(format!("{kind} not raised"))),
        Err(CaseError::Raised(exc)) if exc.kind().is_subclass_of(kind) => Ok(exc),
        Err(other) => Err(other),
    }
}

/// Like [`assert_raises`], and the exception's text must also match `pattern`.
pub fn assert_raises_regex(kind: &ExceptionKind, pattern: &str, outcome: CaseResult<Value>) -> CaseResult<Arc<Exception>> {
    let regex = compile(pattern)?;
    let exc = assert_raises(kind, outcome)?;
    let text = exc.to_string();
    if regex.is_match(&text) {
        return Ok(exc);
    }
    Err(fail_with(format!("\"{pattern}\" does not match \"{text}\"")))
}

/// Expect `outcome` to be a value.
///
/// A raised exception becomes an assertion failure naming it; binding and usage errors are returned unchanged.
pub fn assert_not_raises(outcome: CaseResult<Value>) -> CaseResult<Value> {
    match outcome {
        Err(CaseError::Raised(exc)) => Err(fail_with(format!("Unexpected exception raised: {}", exc.describe()))),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: CaseResult) -> String {
        match result {
            Err(CaseError::Assertion(failure)) => failure.message().to_string(),
            other => panic!("expected an assertion failure, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_messages() {
        assert!(assert_equal(&Value::from(1), &Value::from(1.0)).is_ok());
        assert_eq!(message(assert_equal(&Value::from(-4), &Value::from(5))), "-4 != 5");
        assert_eq!(message(assert_not_equal(&Value::from("a"), &Value::from("a"))), "'a' == 'a'");
    }

    #[test]
    fn test_truth_messages() {
        assert_eq!(message(assert_true(&Value::from(false))), "False is not true");
        assert_eq!(message(assert_false(&Value::list([1]))), "[1] is not false");
        assert!(assert_true(&Value::from("x")).is_ok());
    }

    #[test]
    fn test_identity_and_membership() {
        assert!(assert_is(&Value::None, &Value::None).is_ok());
        assert_eq!(message(assert_is(&Value::list([1]), &Value::list([1]))), "[1] is not [1]");
        assert_eq!(message(assert_is_not(&Value::None, &Value::None)), "unexpectedly identical: None");
        assert_eq!(message(assert_in(&Value::from(1), &Value::list([2, 3]))), "1 not found in [2, 3]");
        assert_eq!(
            message(assert_not_in(&Value::from(2), &Value::list([2, 3]))),
            "2 unexpectedly found in [2, 3]"
        );
    }

    #[test]
    fn test_membership_in_non_container_raises() {
        let err = assert_in(&Value::from(1), &Value::from(3)).unwrap_err();
        assert_eq!(err.exception().map(|e| e.kind().clone()), Some(ExceptionKind::TypeError));
    }

    #[test]
    fn test_instance_messages() {
        assert!(assert_is_instance(&Value::from(true), &TypeTag::Int).is_ok());
        assert_eq!(
            message(assert_is_instance(&Value::from("x"), &TypeTag::Int)),
            "'x' is not an instance of <class 'int'>"
        );
        assert_eq!(
            message(assert_not_is_instance(&Value::from(3), &TypeTag::Int)),
            "3 is an instance of <class 'int'>"
        );
    }

    #[test]
    fn test_almost_equal_places_and_delta() {
        assert!(assert_almost_equal(&Value::from(1.0), &Value::from(1.00000001), Tolerance::default()).is_ok());
        assert_eq!(
            message(assert_almost_equal(&Value::from(1.0), &Value::from(1.1), Tolerance::Places(3))),
            "1.0 != 1.1 within 3 places (0.10000000000000009 difference)"
        );
        assert!(assert_almost_equal(&Value::from(10), &Value::from(12), Tolerance::Delta(2.0)).is_ok());
        assert_eq!(
            message(assert_almost_equal(&Value::from(10), &Value::from(13), Tolerance::Delta(2.0))),
            "10 != 13 within 2.0 delta (3 difference)"
        );
        assert_eq!(
            message(assert_not_almost_equal(&Value::from(2), &Value::from(2), Tolerance::default())),
            "2 == 2"
        );
        assert!(assert_not_almost_equal(&Value::from(1.0), &Value::from(1.1), Tolerance::default()).is_ok());
    }

    #[test]
    fn test_almost_equal_on_extreme_ints_compares_instead_of_overflowing() {
        let first = Value::from(1);
        let second = Value::from(i64::MIN);
        assert_eq!(
            message(assert_almost_equal(&first, &second, Tolerance::default())),
            "1 != -9223372036854775808 within 7 places (9.223372036854776e+18 difference)"
        );
        assert!(assert_not_almost_equal(&first, &second, Tolerance::default()).is_ok());
        assert!(assert_almost_equal(&Value::from(i64::MAX), &Value::from(-1), Tolerance::Delta(1.0)).is_err());
    }

    #[test]
    fn test_almost_equal_on_strings_raises() {
        let err = assert_almost_equal(&Value::from("a"), &Value::from(1), Tolerance::default()).unwrap_err();
        assert_eq!(err.exception().map(|e| e.kind().clone()), Some(ExceptionKind::TypeError));
    }

    #[test]
    fn test_ordering_messages() {
        assert!(assert_greater(&Value::from(3), &Value::from(2.5)).is_ok());
        assert_eq!(message(assert_greater(&Value::from(1), &Value::from(2))), "1 not greater than 2");
        assert_eq!(
            message(assert_less_equal(&Value::from(3), &Value::from(2))),
            "3 not less than or equal to 2"
        );
    }

    #[test]
    fn test_regex_messages() {
        assert!(assert_regex(&Value::from("hello world"), r"wor").is_ok());
        assert_eq!(
            message(assert_regex(&Value::from("hello"), r"^z")),
            "Regex didn't match: '^z' not found in 'hello'"
        );
        assert_eq!(
            message(assert_not_regex(&Value::from("hello"), r"l+")),
            "Regex matched: 'll' matches 'l+' in 'hello'"
        );
        let err = assert_regex(&Value::from(3), r"3").unwrap_err();
        assert_eq!(err.exception().map(|e| e.kind().clone()), Some(ExceptionKind::TypeError));
        let err = assert_regex(&Value::from("x"), r"(").unwrap_err();
        assert_eq!(err.exception().map(|e| e.kind().name().to_string()), Some("re.error".to_string()));
    }

    #[test]
    fn test_count_equal() {
        assert!(assert_count_equal(&Value::list([1, 2, 2]), &Value::tuple([2, 1, 2])).is_ok());
        assert_eq!(
            message(assert_count_equal(&Value::list([1, 3]), &Value::list([1, 1]))),
            "Element counts were not equal:\nFirst has 1, Second has 2:  1\nFirst has 1, Second has 0:  3"
        );
    }

    #[test]
    fn test_list_differences() {
        assert_eq!(
            message(assert_list_equal(&Value::list([1, 2]), &Value::list([1, 3]))),
            "Lists differ: [1, 2] != [1, 3]\n\nFirst differing element 1:\n2\n3"
        );
        assert_eq!(
            message(assert_list_equal(&Value::list([1, 2, 3]), &Value::list([1, 2]))),
            "Lists differ: [1, 2, 3] != [1, 2]\n\nFirst list contains 1 additional elements.\nFirst extra element 2:\n3"
        );
        assert_eq!(
            message(assert_list_equal(&Value::tuple([1]), &Value::list([1]))),
            "First sequence is not a list: (1,)"
        );
    }

    #[test]
    fn test_set_and_dict_differences() {
        assert_eq!(
            message(assert_set_equal(&Value::set([1, 2]), &Value::set([2, 3]))),
            "Items in the first set but not the second:\n1\nItems in the second set but not the first:\n3"
        );
        assert_eq!(
            message(assert_dict_equal(&Value::list([1]), &Value::dict([("a", 1)]))),
            "First argument is not a dictionary"
        );
        assert!(assert_dict_equal(&Value::dict([("a", 1), ("b", 2)]), &Value::dict([("b", 2), ("a", 1)])).is_ok());
    }

    #[test]
    fn test_raises_propagates_other_kinds() {
        let raised: CaseResult<Value> = Err(Exception::value_error("bad").into());
        let err = assert_raises(&ExceptionKind::TypeError, raised).unwrap_err();
        assert!(!err.is_assertion_failure());

        let raised: CaseResult<Value> = Err(Exception::zero_division("division by zero").into());
        assert!(assert_raises(&ExceptionKind::ArithmeticError, raised).is_ok());

        let returned: CaseResult<Value> = Ok(Value::from(1));
        let err = assert_raises(&ExceptionKind::TypeError, returned).map(|_| ());
        assert_eq!(message(err), "TypeError not raised");
    }

    #[test]
    fn test_raises_regex_checks_text() {
        let raised: CaseResult<Value> = Err(Exception::type_error("unsupported operand").into());
        let err = assert_raises_regex(&ExceptionKind::TypeError, "^int", raised).map(|_| ());
        assert_eq!(message(err), "\"^int\" does not match \"unsupported operand\"");
    }

    #[test]
    fn test_note_is_appended_to_failures_only() {
        let noted = assert_equal(&Value::from(1), &Value::from(2)).with_note("totals");
        assert_eq!(message(noted), "1 != 2 : totals");
        let raised: CaseResult = Err(Exception::type_error("boom").into());
        assert_eq!(raised.with_note("ignored").unwrap_err().to_string(), "TypeError: boom");
    }
}
