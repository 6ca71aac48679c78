//! Dynamic values handed to subjects and returned from them.
//!
//! A subject has an arbitrary parameter list, so arguments and results travel as [`Value`]s. The model is deliberately
//! Python-shaped: equality, truthiness, type names and `repr` text follow Python so assertion messages read the way a
//! Python test author expects.
//!
//! ## Notes
//! - Every variant except [`Value::Object`] is plain data: cloning copies the whole tree.
//! - [`Value::Object`] is an immutable record behind an `Arc`. Cloning shares the handle, which is what gives objects
//!   an identity for `is` checks. Isolation for objects is best-effort and relies on their immutability.
//!
//! ## Examples
//! ```rust
//! use subcase_core::Value;
//!
//! let lst = Value::from(vec![1, 2]);
//! assert_eq!(lst.repr(), "[1, 2]");
//! assert_eq!(Value::from(2), Value::from(2.0));
//! assert!(!Value::from("").truthy());
//! ```

use core::fmt;
use core::fmt::Write as _;
use std::sync::Arc;

/// Represent a dynamically typed value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Unordered collection; equality ignores element order.
    Set(Vec<Value>),
    /// Insertion-ordered mapping; equality ignores entry order.
    Dict(Vec<(Value, Value)>),
    Object(Arc<Object>),
}

/// Represent an immutable user record (the analogue of a Python class instance).
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    class: String,
    attrs: Vec<(String, Value)>,
}

impl Object {
    /// Create an object of `class` with no attributes.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            attrs: Vec::new(),
        }
    }

    /// Set an attribute, replacing a previous value of the same name.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn attrs(&self) -> &[(String, Value)] {
        &self.attrs
    }
}

/// Name a type for `isinstance`-style checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Python's `object`: every value is an instance.
    Object,
    NoneType,
    Bool,
    /// `int`; like Python, `bool` values are instances of `int`.
    Int,
    Float,
    Str,
    List,
    Tuple,
    Set,
    Dict,
    /// A user class, matched against [`Object::class`].
    Class(String),
}

impl TypeTag {
    /// Tag for a user class by name.
    pub fn class(name: impl Into<String>) -> Self {
        TypeTag::Class(name.into())
    }

    /// Return the Python spelling of the type.
    pub fn name(&self) -> &str {
        match self {
            TypeTag::Object => "object",
            TypeTag::NoneType => "NoneType",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::List => "list",
            TypeTag::Tuple => "tuple",
            TypeTag::Set => "set",
            TypeTag::Dict => "dict",
            TypeTag::Class(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name())
    }
}

/// Numeric view of a value, with Python's `bool -> int` coercion applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl Value {
    /// Build a list from anything convertible into values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a set, dropping duplicates (first occurrence wins).
    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Value::Set(out)
    }

    /// Build a dict; a repeated key overwrites the earlier value but keeps its position.
    pub fn dict<K: Into<Value>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (k, v) in entries {
            let (k, v) = (k.into(), v.into());
            match out.iter_mut().find(|(existing, _)| *existing == k) {
                Some(slot) => slot.1 = v,
                None => out.push((k, v)),
            }
        }
        Value::Dict(out)
    }

    /// Return a structurally independent copy of this value.
    ///
    /// ## Notes
    /// - Containers and scalars are copied all the way down, so mutating the copy is never observable through the
    ///   original.
    /// - Objects are immutable and keep sharing their handle; identity (`is`) is preserved across the copy.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::None => Value::None,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(s.clone()),
            Value::List(items) => Value::List(items.iter().map(Value::deep_clone).collect()),
            Value::Tuple(items) => Value::Tuple(items.iter().map(Value::deep_clone).collect()),
            Value::Set(items) => Value::Set(items.iter().map(Value::deep_clone).collect()),
            Value::Dict(entries) => Value::Dict(
                entries
                    .iter()
                    .map(|(k, v)| (k.deep_clone(), v.deep_clone()))
                    .collect(),
            ),
            Value::Object(obj) => Value::Object(Arc::clone(obj)),
        }
    }

    /// Return the Python type name (`int`, `list`, `NoneType`, or the object's class).
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Object(obj) => obj.class(),
        }
    }

    /// Python truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Identity comparison (`is`).
    ///
    /// `None`, `True` and `False` are singletons and objects compare by handle. Every other value is a fresh copy
    /// wherever it is observed, so it is never identical to anything.
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_instance(&self, tag: &TypeTag) -> bool {
        match tag {
            TypeTag::Object => true,
            TypeTag::NoneType => matches!(self, Value::None),
            TypeTag::Bool => matches!(self, Value::Bool(_)),
            TypeTag::Int => matches!(self, Value::Int(_) | Value::Bool(_)),
            TypeTag::Float => matches!(self, Value::Float(_)),
            TypeTag::Str => matches!(self, Value::Str(_)),
            TypeTag::List => matches!(self, Value::List(_)),
            TypeTag::Tuple => matches!(self, Value::Tuple(_)),
            TypeTag::Set => matches!(self, Value::Set(_)),
            TypeTag::Dict => matches!(self, Value::Dict(_)),
            TypeTag::Class(name) => matches!(self, Value::Object(obj) if obj.class() == name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        self.as_number().map(Number::to_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up `key` in a dict value.
    pub fn dict_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Return the elements produced by iterating this value, or `None` if it is not iterable.
    ///
    /// Dicts iterate their keys and strings their characters, as in Python.
    pub fn iterate(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items.clone()),
            Value::Dict(entries) => Some(entries.iter().map(|(k, _)| k.clone()).collect()),
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            _ => None,
        }
    }

    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Render Python `repr()` text.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing to String cannot fail.
        let _ = self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) -> fmt::Result {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => write!(out, "{i}")?,
            Value::Float(f) => out.push_str(&float_repr(*f)),
            Value::Str(s) => out.push_str(&str_repr(s)),
            Value::List(items) => write_seq(out, "[", items, "]")?,
            Value::Tuple(items) if items.len() == 1 => {
                out.push('(');
                items[0].write_repr(out)?;
                out.push_str(",)");
            }
            Value::Tuple(items) => write_seq(out, "(", items, ")")?,
            Value::Set(items) if items.is_empty() => out.push_str("set()"),
            Value::Set(items) => write_seq(out, "{", items, "}")?,
            Value::Dict(entries) => {
                out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out)?;
                    out.push_str(": ");
                    v.write_repr(out)?;
                }
                out.push('}');
            }
            Value::Object(obj) => {
                out.push_str(obj.class());
                out.push('(');
                for (i, (name, v)) in obj.attrs().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push('=');
                    v.write_repr(out)?;
                }
                out.push(')');
            }
        }
        Ok(())
    }
}

fn write_seq(out: &mut String, open: &str, items: &[Value], close: &str) -> fmt::Result {
    out.push_str(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out)?;
    }
    out.push_str(close);
    Ok(())
}

/// Python `repr()` for floats: shortest round-trip digits, always with a `.0` or an exponent.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{f:e}");
        if let Some((mantissa, exp)) = s.split_once('e') {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            return format!("{mantissa}e{sign}{digits:0>2}");
        }
        return s;
    }
    let s = format!("{f}");
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Python `repr()` for strings: single quotes unless the text contains only single quotes.
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x)),
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| other.dict_get(k) == Some(v))
            }
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
                (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// Python `str()`: strings render bare, everything else as `repr()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => f.write_str(&other.repr()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(Arc::new(obj))
    }
}

impl From<Arc<Object>> for Value {
    fn from(obj: Arc<Object>) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::from(2), Value::from(2.0));
        assert_eq!(Value::from(true), Value::from(1));
        assert_ne!(Value::from(2), Value::from("2"));
    }

    #[test]
    fn test_list_and_tuple_never_equal() {
        assert_ne!(Value::list([1, 2]), Value::tuple([1, 2]));
    }

    #[test]
    fn test_set_and_dict_equality_ignore_order() {
        assert_eq!(Value::set([1, 2, 3]), Value::set([3, 1, 2]));
        assert_eq!(Value::dict([("a", 1), ("b", 2)]), Value::dict([("b", 2), ("a", 1)]));
        assert_ne!(Value::dict([("a", 1)]), Value::dict([("a", 2)]));
    }

    #[test]
    fn test_set_construction_drops_duplicates() {
        assert_eq!(Value::set([1, 1, 2]).repr(), "{1, 2}");
    }

    #[test]
    fn test_repr_matches_python() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::from(true).repr(), "True");
        assert_eq!(Value::from(2.0).repr(), "2.0");
        assert_eq!(Value::from(31.5367).repr(), "31.5367");
        assert_eq!(Value::from(1e20).repr(), "1e+20");
        assert_eq!(Value::from(1.5e-5).repr(), "1.5e-05");
        assert_eq!(Value::from("it's").repr(), "\"it's\"");
        assert_eq!(Value::from("a\nb").repr(), "'a\\nb'");
        assert_eq!(Value::tuple([1]).repr(), "(1,)");
        assert_eq!(Value::set(Vec::<Value>::new()).repr(), "set()");
        assert_eq!(Value::dict([("a", Value::None)]).repr(), "{'a': None}");
        assert_eq!(Value::from(Object::new("Point").with_attr("x", 1)).repr(), "Point(x=1)");
    }

    #[test]
    fn test_display_is_python_str() {
        assert_eq!(Value::from("raw").to_string(), "raw");
        assert_eq!(Value::list(["a"]).to_string(), "['a']");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.truthy());
        assert!(!Value::from(0).truthy());
        assert!(!Value::list(Vec::<i64>::new()).truthy());
        assert!(Value::from(-0.5).truthy());
        assert!(Value::from(Object::new("Empty")).truthy());
    }

    #[test]
    fn test_identity_only_for_singletons_and_objects() {
        let obj = Value::from(Object::new("Handle"));
        assert!(Value::None.is(&Value::None));
        assert!(obj.is(&obj.clone()));
        assert!(!obj.is(&Value::from(Object::new("Handle"))));
        assert!(!Value::from(5).is(&Value::from(5)));
    }

    #[test]
    fn test_bool_is_instance_of_int() {
        assert!(Value::from(true).is_instance(&TypeTag::Int));
        assert!(!Value::from(1).is_instance(&TypeTag::Bool));
        assert!(Value::from(Object::new("Foo")).is_instance(&TypeTag::class("Foo")));
        assert!(Value::None.is_instance(&TypeTag::Object));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = Value::list([Value::list([1, 2])]);
        let mut copy = original.deep_clone();
        if let Some(inner) = copy.as_list_mut().and_then(|items| items[0].as_list_mut()) {
            inner.push(Value::from(3));
        }
        assert_eq!(original, Value::list([Value::list([1, 2])]));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_deep_clone_shares_objects() {
        let obj = Value::from(Object::new("Conn"));
        assert!(obj.deep_clone().is(&obj));
    }
}
