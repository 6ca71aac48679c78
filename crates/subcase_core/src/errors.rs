//! Exception taxonomy (Python-like) raised by subjects.
//!
//! Subjects signal failure by returning an [`Exception`]. The kinds form a small hierarchy so that "raises X"
//! assertions accept subclasses the way `assertRaises` does (`ZeroDivisionError` is an `ArithmeticError`, everything
//! is an `Exception`).

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::value::Value;

/// Stable identifier for an exception class.
///
/// Kinds compare and hash by class name, so `Custom("TypeError")` is the builtin `TypeError`. Prefer
/// [`ExceptionKind::from_name`] to build kinds from names.
#[derive(Debug, Clone)]
pub enum ExceptionKind {
    Exception,
    ArithmeticError,
    ZeroDivisionError,
    OverflowError,
    LookupError,
    IndexError,
    KeyError,
    TypeError,
    ValueError,
    AttributeError,
    RuntimeError,
    NotImplementedError,
    AssertionError,
    MemoryError,
    /// User-defined exception class; a direct subclass of `Exception`.
    Custom(String),
}

/// Builtin kinds with their canonical spelling.
const BUILTINS: &[(ExceptionKind, &str)] = &[
    (ExceptionKind::Exception, "Exception"),
    (ExceptionKind::ArithmeticError, "ArithmeticError"),
    (ExceptionKind::ZeroDivisionError, "ZeroDivisionError"),
    (ExceptionKind::OverflowError, "OverflowError"),
    (ExceptionKind::LookupError, "LookupError"),
    (ExceptionKind::IndexError, "IndexError"),
    (ExceptionKind::KeyError, "KeyError"),
    (ExceptionKind::TypeError, "TypeError"),
    (ExceptionKind::ValueError, "ValueError"),
    (ExceptionKind::AttributeError, "AttributeError"),
    (ExceptionKind::RuntimeError, "RuntimeError"),
    (ExceptionKind::NotImplementedError, "NotImplementedError"),
    (ExceptionKind::AssertionError, "AssertionError"),
    (ExceptionKind::MemoryError, "MemoryError"),
];

impl ExceptionKind {
    /// Resolve a class name; unknown names become [`ExceptionKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        BUILTINS
            .iter()
            .find(|(_, canonical)| *canonical == name)
            .map(|(kind, _)| kind.clone())
            .unwrap_or_else(|| ExceptionKind::Custom(name.to_string()))
    }

    /// Return the class name.
    pub fn name(&self) -> &str {
        match self {
            ExceptionKind::Custom(name) => name,
            builtin => BUILTINS
                .iter()
                .find(|(kind, _)| core::mem::discriminant(kind) == core::mem::discriminant(builtin))
                .map_or("Exception", |(_, canonical)| *canonical),
        }
    }

    /// Return the direct base class, or `None` for the root `Exception`.
    pub fn parent(&self) -> Option<ExceptionKind> {
        if let ExceptionKind::Custom(name) = self {
            let resolved = ExceptionKind::from_name(name);
            if !matches!(resolved, ExceptionKind::Custom(_)) {
                return resolved.parent();
            }
        }
        match self {
            ExceptionKind::Exception => None,
            ExceptionKind::ZeroDivisionError | ExceptionKind::OverflowError => Some(ExceptionKind::ArithmeticError),
            ExceptionKind::IndexError | ExceptionKind::KeyError => Some(ExceptionKind::LookupError),
            ExceptionKind::NotImplementedError => Some(ExceptionKind::RuntimeError),
            _ => Some(ExceptionKind::Exception),
        }
    }

    /// Check whether `self` is `ancestor` or derives from it.
    pub fn is_subclass_of(&self, ancestor: &ExceptionKind) -> bool {
        let mut current = Some(self.clone());
        while let Some(kind) = current {
            if kind == *ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl PartialEq for ExceptionKind {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ExceptionKind {}

impl Hash for ExceptionKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raised failure: a kind plus its constructor arguments.
///
/// ## Notes
/// - Like Python's `BaseException.args`, an exception may carry no arguments at all, or a first argument that is not
///   a string. [`Exception::message`] only reports a message for a string first argument; callers that inspect message
///   text must handle `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    kind: ExceptionKind,
    args: Vec<Value>,
}

impl Exception {
    /// Create an exception with a single message argument.
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            args: vec![Value::Str(message.into())],
        }
    }

    /// Create an exception with no arguments (`raise ValueError`).
    pub fn bare(kind: ExceptionKind) -> Self {
        Self { kind, args: Vec::new() }
    }

    /// Create an exception with arbitrary arguments.
    pub fn with_args(kind: ExceptionKind, args: Vec<Value>) -> Self {
        Self { kind, args }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::AttributeError, message)
    }

    pub fn key_error(key: &Value) -> Self {
        Self::with_args(ExceptionKind::KeyError, vec![key.clone()])
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::IndexError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ZeroDivisionError, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::OverflowError, message)
    }

    pub fn kind(&self) -> &ExceptionKind {
        &self.kind
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Return the first argument when it is a string.
    pub fn message(&self) -> Option<&str> {
        self.args.first().and_then(Value::as_str)
    }

    /// Render `Kind: text` the way a traceback's last line does.
    pub fn describe(&self) -> String {
        let text = self.to_string();
        if text.is_empty() {
            self.kind.name().to_string()
        } else {
            format!("{}: {}", self.kind, text)
        }
    }
}

/// Python `str(exc)`: empty for no args, the bare argument for one, the args tuple otherwise.
///
/// `KeyError` renders its single argument with `repr()`.
impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.args.as_slice() {
            [] => Ok(()),
            [single] if self.kind == ExceptionKind::KeyError => f.write_str(&single.repr()),
            [single] => write!(f, "{single}"),
            many => write!(f, "{}", Value::Tuple(many.to_vec()).repr()),
        }
    }
}

impl std::error::Error for Exception {}
