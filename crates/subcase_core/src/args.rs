//! Declared argument sets: the positional and keyword values a test method hands to its subject.

use crate::value::Value;

/// Represent an ordered positional sequence plus an insertion-ordered keyword mapping.
///
/// ## Notes
/// - Declaring the same keyword twice keeps the first position and the last value, like a Python dict literal.
/// - Accessors that hand data to callers ([`Args::positional`], [`Args::keywords`]) return deep copies, so a caller
///   can mutate what it receives without touching the stored set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl Args {
    /// Create an empty argument set (what undecorated test methods get).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.keywords.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.keywords.push((name, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Borrow the positional values.
    pub fn positional_ref(&self) -> &[Value] {
        &self.positional
    }

    /// Borrow the keyword entries in declaration order.
    pub fn keywords_ref(&self) -> &[(String, Value)] {
        &self.keywords
    }

    /// Return a deep copy of the positional values.
    pub fn positional(&self) -> Vec<Value> {
        self.positional.iter().map(Value::deep_clone).collect()
    }

    /// Return a deep copy of the keyword entries in declaration order.
    pub fn keywords(&self) -> Vec<(String, Value)> {
        self.keywords
            .iter()
            .map(|(name, value)| (name.clone(), value.deep_clone()))
            .collect()
    }

    /// Return a deep copy of the keyword value named `name`.
    pub fn keyword(&self, name: &str) -> Option<Value> {
        self.keywords
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.deep_clone())
    }

    /// Return a structurally independent copy of the whole set.
    pub fn deep_clone(&self) -> Self {
        Self {
            positional: self.positional(),
            keywords: self.keywords(),
        }
    }

    /// Render the set as call syntax, e.g. `(1, b=2)`.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .positional
            .iter()
            .map(Value::repr)
            .chain(self.keywords.iter().map(|(name, value)| format!("{name}={}", value.repr())))
            .collect();
        format!("({})", parts.join(", "))
    }
}
