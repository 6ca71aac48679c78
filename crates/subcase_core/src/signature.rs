//! Subject signatures and Python-style argument binding.
//!
//! A subject declares its parameters with a [`Signature`]; the engine binds the test method's declared [`Args`] onto
//! it before every subject call. Binding mirrors a Python call: positional values fill parameters left to right,
//! keywords fill by name, defaults cover the rest, and `*args` / `**kwargs` collectors soak up extras.
//!
//! ## Notes
//! - Binding failures are `TypeError`s whose text matches CPython's wording
//!   (`subject() missing 2 required positional arguments: 'c' and 'd'`). The engine's binding-error classifier keys on
//!   that wording, so the two must change together.

use crate::args::Args;
use crate::errors::Exception;
use crate::value::Value;

/// Default callable name used in binding messages.
pub const DEFAULT_SUBJECT_NAME: &str = "subject";

/// A positional-or-keyword parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// The declared parameter list of a subject.
///
/// ## Examples
/// ```rust
/// use subcase_core::{Args, Signature};
///
/// let sig = Signature::new().param("a").param("b");
/// let err = sig.bind(&Args::new().kwarg("a", 1)).unwrap_err();
/// assert_eq!(err.to_string(), "subject() missing 1 required positional argument: 'b'");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    var_positional: Option<String>,
    var_keyword: Option<String>,
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

impl Signature {
    /// An empty signature for a callable named `subject`.
    pub fn new() -> Self {
        Self::named(DEFAULT_SUBJECT_NAME)
    }

    /// An empty signature for a callable with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            var_positional: None,
            var_keyword: None,
        }
    }

    /// Add a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Add a parameter with a default value.
    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param::optional(name, default));
        self
    }

    /// Accept extra positional values under `name` (`*name`).
    pub fn var_args(mut self, name: impl Into<String>) -> Self {
        self.var_positional = Some(name.into());
        self
    }

    /// Accept extra keyword values under `name` (`**name`).
    pub fn var_kwargs(mut self, name: impl Into<String>) -> Self {
        self.var_keyword = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind `args` onto this signature.
    ///
    /// ## Errors
    /// - `TypeError` with CPython wording for: too many positional values, an unexpected keyword, a keyword that
    ///   repeats a positional value, and missing required parameters.
    pub fn bind(&self, args: &Args) -> Result<BoundCall, Exception> {
        let positional = args.positional_ref();
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let mut extra_positional = Vec::new();

        if positional.len() > self.params.len() && self.var_positional.is_none() {
            return Err(Exception::type_error(self.too_many_positional(positional.len())));
        }
        for (i, value) in positional.iter().enumerate() {
            match slots.get_mut(i) {
                Some(slot) => *slot = Some(value.clone()),
                None => extra_positional.push(value.clone()),
            }
        }

        let mut extra_keywords = Vec::new();
        for (name, value) in args.keywords_ref() {
            match self.params.iter().position(|p| p.name == *name) {
                Some(i) if slots[i].is_some() => {
                    return Err(Exception::type_error(format!(
                        "{}() got multiple values for argument '{}'",
                        self.name, name
                    )));
                }
                Some(i) => slots[i] = Some(value.clone()),
                None if self.var_keyword.is_some() => extra_keywords.push((name.clone(), value.clone())),
                None => {
                    return Err(Exception::type_error(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        self.name, name
                    )));
                }
            }
        }

        let missing: Vec<&str> = self
            .params
            .iter()
            .zip(&slots)
            .filter(|(param, slot)| slot.is_none() && param.default.is_none())
            .map(|(param, _)| param.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Exception::type_error(format!(
                "{}() missing {} required positional argument{}: {}",
                self.name,
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                quote_list(&missing)
            )));
        }

        let values = self
            .params
            .iter()
            .zip(slots)
            .map(|(param, slot)| {
                let value = slot.or_else(|| param.default.clone()).unwrap_or_default();
                (param.name.clone(), value)
            })
            .collect();

        Ok(BoundCall {
            name: self.name.clone(),
            values,
            extra_positional,
            extra_keywords,
        })
    }

    fn too_many_positional(&self, given: usize) -> String {
        let required = self.params.iter().filter(|p| p.default.is_none()).count();
        let total = self.params.len();
        let takes = if required == total {
            format!("{total} positional argument{}", if total == 1 { "" } else { "s" })
        } else {
            format!("from {required} to {total} positional arguments")
        };
        let verb = if given == 1 { "was" } else { "were" };
        format!("{}() takes {takes} but {given} {verb} given", self.name)
    }
}

/// Quote names the way CPython lists missing arguments: `'a'`, `'a' and 'b'`, `'a', 'b', and 'c'`.
fn quote_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Arguments bound to a subject's parameters for one call.
///
/// The engine builds a fresh `BoundCall` from a deep copy of the stored arguments for every subject invocation, so a
/// subject may take ownership of (and mutate) whatever it receives.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCall {
    name: String,
    values: Vec<(String, Value)>,
    extra_positional: Vec<Value>,
    extra_keywords: Vec<(String, Value)>,
}

impl BoundCall {
    /// Borrow the value bound to parameter `name`.
    ///
    /// ## Errors
    /// - `TypeError` if the signature has no such parameter.
    pub fn get(&self, name: &str) -> Result<&Value, Exception> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| self.no_such_parameter(name))
    }

    /// Move the value bound to parameter `name` out, leaving `None` behind.
    ///
    /// ## Errors
    /// - `TypeError` if the signature has no such parameter.
    pub fn take(&mut self, name: &str) -> Result<Value, Exception> {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, value)) => Ok(std::mem::take(value)),
            None => Err(self.no_such_parameter(name)),
        }
    }

    /// Values collected by `*args`.
    pub fn var_args(&self) -> &[Value] {
        &self.extra_positional
    }

    /// Values collected by `**kwargs`.
    pub fn var_kwargs(&self) -> &[(String, Value)] {
        &self.extra_keywords
    }

    /// Iterate bound parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn no_such_parameter(&self, name: &str) -> Exception {
        Exception::type_error(format!("{}() has no parameter '{}'", self.name, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_signature() -> Signature {
        Signature::new().param("a").param("b")
    }

    #[test]
    fn test_bind_keywords() {
        let call = add_signature()
            .bind(&Args::new().kwarg("a", 2).kwarg("b", -6))
            .unwrap();
        assert_eq!(call.get("a").unwrap(), &Value::from(2));
        assert_eq!(call.get("b").unwrap(), &Value::from(-6));
    }

    #[test]
    fn test_bind_positional_then_keyword() {
        let call = add_signature().bind(&Args::new().arg(1).kwarg("b", 2)).unwrap();
        let bound: Vec<_> = call.iter().map(|(n, v)| (n.to_string(), v.clone())).collect();
        assert_eq!(
            bound,
            vec![("a".to_string(), Value::from(1)), ("b".to_string(), Value::from(2))]
        );
    }

    #[test]
    fn test_defaults_fill_missing() {
        let sig = Signature::new().param("a").param_with_default("scale", 10);
        let call = sig.bind(&Args::new().arg(3)).unwrap();
        assert_eq!(call.get("scale").unwrap(), &Value::from(10));
    }

    #[test]
    fn test_missing_messages() {
        let sig = Signature::new().param("a").param("b").param("c").param("d");
        let one = sig.bind(&Args::new().arg(1).arg(2).arg(3)).unwrap_err();
        assert_eq!(one.to_string(), "subject() missing 1 required positional argument: 'd'");

        let two = sig.bind(&Args::new().kwarg("a", 1).kwarg("b", 2)).unwrap_err();
        assert_eq!(
            two.to_string(),
            "subject() missing 2 required positional arguments: 'c' and 'd'"
        );

        let three = sig.bind(&Args::new().arg(1)).unwrap_err();
        assert_eq!(
            three.to_string(),
            "subject() missing 3 required positional arguments: 'b', 'c', and 'd'"
        );
    }

    #[test]
    fn test_unexpected_keyword() {
        let err = add_signature()
            .bind(&Args::new().kwarg("a", 1).kwarg("b", 2).kwarg("c", 2))
            .unwrap_err();
        assert_eq!(err.kind(), &crate::ExceptionKind::TypeError);
        assert_eq!(err.to_string(), "subject() got an unexpected keyword argument 'c'");
    }

    #[test]
    fn test_too_many_positional() {
        let err = add_signature().bind(&Args::new().arg(1).arg(2).arg(3)).unwrap_err();
        assert_eq!(err.to_string(), "subject() takes 2 positional arguments but 3 were given");

        let err = Signature::new().bind(&Args::new().arg(1)).unwrap_err();
        assert_eq!(err.to_string(), "subject() takes 0 positional arguments but 1 was given");

        let sig = Signature::new().param("a").param_with_default("b", 0);
        let err = sig.bind(&Args::new().arg(1).arg(2).arg(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "subject() takes from 1 to 2 positional arguments but 3 were given"
        );
    }

    #[test]
    fn test_multiple_values() {
        let err = add_signature().bind(&Args::new().arg(1).kwarg("a", 2)).unwrap_err();
        assert_eq!(err.to_string(), "subject() got multiple values for argument 'a'");
    }

    #[test]
    fn test_collectors_absorb_extras() {
        let sig = Signature::new().param("a").var_args("rest").var_kwargs("options");
        let call = sig
            .bind(&Args::new().arg(1).arg(2).arg(3).kwarg("verbose", true))
            .unwrap();
        assert_eq!(call.var_args(), &[Value::from(2), Value::from(3)]);
        assert_eq!(call.var_kwargs(), &[("verbose".to_string(), Value::from(true))]);
    }

    #[test]
    fn test_custom_name_appears_in_messages() {
        let err = Signature::named("add").bind(&Args::new().kwarg("x", 1)).unwrap_err();
        assert_eq!(err.to_string(), "add() got an unexpected keyword argument 'x'");
    }

    #[test]
    fn test_unknown_parameter_lookup() {
        let mut call = add_signature().bind(&Args::new().arg(1).arg(2)).unwrap();
        assert_eq!(call.take("a").unwrap(), Value::from(1));
        assert_eq!(call.get("a").unwrap(), &Value::None);
        assert_eq!(
            call.get("zzz").unwrap_err().to_string(),
            "subject() has no parameter 'zzz'"
        );
    }
}
