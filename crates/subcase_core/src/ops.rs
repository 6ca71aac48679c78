//! Python-like operators over [`Value`]s.
//!
//! Subjects are ordinary Rust code, but the values they receive are dynamic. These helpers give them the operator
//! semantics a Python author expects (int/float promotion, sequence concatenation, lexicographic ordering) and raise
//! the same exception kinds with CPython-shaped messages when operand types don't fit.

use core::cmp::Ordering;

use crate::errors::{Exception, ExceptionKind};
use crate::value::{Number, Value};

/// Comparison operator, used for ordering checks and their error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtEq => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::GtEq => ordering != Ordering::Less,
        }
    }
}

fn unsupported_operands(symbol: &str, a: &Value, b: &Value) -> Exception {
    Exception::type_error(format!(
        "unsupported operand type(s) for {symbol}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

fn int_overflow() -> Exception {
    Exception::overflow("integer overflow")
}

fn numeric(
    symbol: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Exception> {
    match (a.as_number(), b.as_number()) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => int_op(x, y).map(Value::Int).ok_or_else(int_overflow),
        (Some(x), Some(y)) => Ok(Value::Float(float_op(x.to_f64(), y.to_f64()))),
        _ => Err(unsupported_operands(symbol, a, b)),
    }
}

/// `a + b`.
///
/// ## Errors
/// - `TypeError` for operand types Python would reject (e.g. `None + 2`, `'a' + 1`).
/// - `OverflowError` when an integer sum leaves the `i64` range.
pub fn add(a: &Value, b: &Value) -> Result<Value, Exception> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
        (Value::List(x), Value::List(y)) => Ok(Value::List(x.iter().chain(y).cloned().collect())),
        (Value::Tuple(x), Value::Tuple(y)) => Ok(Value::Tuple(x.iter().chain(y).cloned().collect())),
        (Value::Str(_), _) => Err(Exception::type_error(format!(
            "can only concatenate str (not \"{}\") to str",
            b.type_name()
        ))),
        (Value::List(_), _) => Err(Exception::type_error(format!(
            "can only concatenate list (not \"{}\") to list",
            b.type_name()
        ))),
        _ => numeric("+", a, b, i64::checked_add, |x, y| x + y),
    }
}

/// `a - b`.
pub fn sub(a: &Value, b: &Value) -> Result<Value, Exception> {
    numeric("-", a, b, i64::checked_sub, |x, y| x - y)
}

/// Longest sequence (items, or bytes for strings) that repetition will build.
pub const MAX_REPEAT_LEN: usize = 1 << 26;

/// How many copies `len * times` repetition makes; negative counts repeat zero times.
fn repeat_count(len: usize, times: i64, too_long: fn() -> Exception) -> Result<usize, Exception> {
    if times <= 0 || len == 0 {
        return Ok(0);
    }
    let times = usize::try_from(times).map_err(|_| too_long())?;
    match len.checked_mul(times) {
        None => Err(too_long()),
        Some(total) if total > MAX_REPEAT_LEN => Err(Exception::bare(ExceptionKind::MemoryError)),
        Some(_) => Ok(times),
    }
}

/// `a * b`, including sequence repetition (`[1] * 3`, `'ab' * 2`).
///
/// ## Errors
/// - `OverflowError` / `MemoryError` when a repeated sequence would exceed [`MAX_REPEAT_LEN`].
pub fn mul(a: &Value, b: &Value) -> Result<Value, Exception> {
    fn repeat<T: Clone>(items: &[T], times: i64) -> Result<Vec<T>, Exception> {
        let times = repeat_count(items.len(), times, || Exception::bare(ExceptionKind::MemoryError))?;
        Ok(items.iter().cloned().cycle().take(items.len() * times).collect())
    }
    match (a, b) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            let times = repeat_count(s.len(), *n, || Exception::overflow("repeated string is too long"))?;
            Ok(Value::Str(s.repeat(times)))
        }
        (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
            Ok(Value::List(repeat(items, *n)?))
        }
        (Value::Tuple(items), Value::Int(n)) | (Value::Int(n), Value::Tuple(items)) => {
            Ok(Value::Tuple(repeat(items, *n)?))
        }
        _ => numeric("*", a, b, i64::checked_mul, |x, y| x * y),
    }
}

/// `a / b` (true division; always a float, like Python 3).
///
/// ## Errors
/// - `ZeroDivisionError` when `b` is zero.
pub fn true_div(a: &Value, b: &Value) -> Result<Value, Exception> {
    match (a.as_number(), b.as_number()) {
        (Some(_), Some(y)) if y.to_f64() == 0.0 => Err(Exception::zero_division("division by zero")),
        (Some(x), Some(y)) => Ok(Value::Float(x.to_f64() / y.to_f64())),
        _ => Err(unsupported_operands("/", a, b)),
    }
}

/// Three-way comparison, or `None` for unordered pairs (NaN, sequences containing NaN).
///
/// ## Errors
/// - `TypeError` when Python would refuse to order the operands (e.g. `'a' < 1`, `None < None`).
pub fn compare(a: &Value, b: &Value, op: CompareOp) -> Result<Option<Ordering>, Exception> {
    let unsupported = || {
        Exception::type_error(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ))
    };
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        (Value::List(x), Value::List(y)) | (Value::Tuple(x), Value::Tuple(y)) => {
            for (left, right) in x.iter().zip(y) {
                if left != right {
                    return compare(left, right, op);
                }
            }
            Ok(Some(x.len().cmp(&y.len())))
        }
        _ => match (a.as_number(), b.as_number()) {
            (Some(Number::Int(x)), Some(Number::Int(y))) => Ok(Some(x.cmp(&y))),
            (Some(x), Some(y)) => Ok(x.to_f64().partial_cmp(&y.to_f64())),
            _ => Err(unsupported()),
        },
    }
}

/// Evaluate `a <op> b` to a boolean.
pub fn compare_op(a: &Value, b: &Value, op: CompareOp) -> Result<bool, Exception> {
    Ok(compare(a, b, op)?.is_some_and(|ordering| op.holds(ordering)))
}

/// `item in container`.
///
/// ## Errors
/// - `TypeError` when `container` does not support membership, or when testing a non-string inside a string.
pub fn contains(container: &Value, item: &Value) -> Result<bool, Exception> {
    match container {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.contains(item)),
        Value::Dict(_) => Ok(container.dict_get(item).is_some()),
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(Exception::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        other => Err(Exception::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// `len(value)`.
pub fn len(value: &Value) -> Result<usize, Exception> {
    match value {
        Value::Str(s) => Ok(s.chars().count()),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.len()),
        Value::Dict(entries) => Ok(entries.len()),
        other => Err(Exception::type_error(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

/// `container.append(item)`, mutating the list in place.
///
/// ## Errors
/// - `AttributeError` when `container` is not a list.
pub fn list_append(container: &mut Value, item: Value) -> Result<(), Exception> {
    match container.as_list_mut() {
        Some(items) => {
            items.push(item);
            Ok(())
        }
        None => Err(Exception::attribute_error(format!(
            "'{}' object has no attribute 'append'",
            container.type_name()
        ))),
    }
}

/// `container[index]` for lists and tuples (negative indices count from the end) and dicts.
///
/// ## Errors
/// - `IndexError` / `KeyError` for missing positions or keys, `TypeError` for non-subscriptable values.
pub fn get_item(container: &Value, index: &Value) -> Result<Value, Exception> {
    match (container, index) {
        (Value::List(items) | Value::Tuple(items), Value::Int(i)) => {
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let pos = if *i < 0 { len + i } else { *i };
            usize::try_from(pos)
                .ok()
                .and_then(|pos| items.get(pos))
                .cloned()
                .ok_or_else(|| Exception::index_error(format!("{} index out of range", container.type_name())))
        }
        (Value::Dict(_), key) => container.dict_get(key).cloned().ok_or_else(|| Exception::key_error(key)),
        (Value::List(_) | Value::Tuple(_), other) => Err(Exception::type_error(format!(
            "{} indices must be integers or slices, not {}",
            container.type_name(),
            other.type_name()
        ))),
        (other, _) => Err(Exception::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}
