//! Argument Binder: attach declared argument sets to test methods.
//!
//! Declarations live in an explicit side-table ([`ArgsTable`]) keyed by method name, filled once when the suite is
//! defined and only read afterwards. Nothing is stored on the method itself, so a decorated method is still an
//! ordinary `fn(&mut Case<S>) -> CaseResult` from the runner's point of view.
//!
//! Suites are usually produced by `#[subject_case]`, which turns each `#[args(...)]` marker into a
//! [`Suite::declare`] call; the builder API below is what that expansion targets.

use std::collections::HashMap;
use std::fmt;

pub use subcase_core::Args;

use crate::case::{Case, Subject};
use crate::error::CaseResult;

/// Build an [`Args`] from call-like syntax: positional values first or interleaved, keywords as `name = value`.
///
/// ```rust
/// let args = subcase::args!(1, "two", scale = 3);
/// assert_eq!(args.describe(), "(1, 'two', scale=3)");
/// ```
#[macro_export]
macro_rules! args {
    (@acc [$acc:expr]) => { $acc };
    (@acc [$acc:expr] $name:ident = $value:expr $(, $($rest:tt)*)?) => {
        $crate::args!(@acc [$acc.kwarg(stringify!($name), $value)] $($($rest)*)?)
    };
    (@acc [$acc:expr] $value:expr $(, $($rest:tt)*)?) => {
        $crate::args!(@acc [$acc.arg($value)] $($($rest)*)?)
    };
    ($($body:tt)*) => {
        $crate::args!(@acc [$crate::Args::new()] $($body)*)
    };
}

/// Side-table from test-method name to its declared argument set.
#[derive(Debug, Clone, Default)]
pub struct ArgsTable {
    entries: HashMap<String, Args>,
}

impl ArgsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the declared arguments for `method`.
    ///
    /// Entries are immutable once recorded: a second declaration for the same method is ignored (and logged) and
    /// `false` is returned.
    pub fn declare(&mut self, method: impl Into<String>, args: Args) -> bool {
        let method = method.into();
        if self.entries.contains_key(&method) {
            tracing::warn!(method = %method, "ignoring repeated argument declaration");
            return false;
        }
        self.entries.insert(method, args);
        true
    }

    /// Return a copy of the arguments declared for `method`, or an empty set for undecorated methods.
    pub fn lookup(&self, method: &str) -> Args {
        self.entries.get(method).map(Args::deep_clone).unwrap_or_default()
    }

    pub fn get(&self, method: &str) -> Option<&Args> {
        self.entries.get(method)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Body of a test method.
pub type TestFn<S> = fn(&mut Case<S>) -> CaseResult;

/// A named test method with its documentation.
pub struct TestMethod<S> {
    name: String,
    doc: String,
    body: TestFn<S>,
}

impl<S> TestMethod<S> {
    pub fn new(name: impl Into<String>, body: TestFn<S>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            body,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method's doc text, if it has any.
    pub fn doc(&self) -> Option<&str> {
        if self.doc.is_empty() { None } else { Some(&self.doc) }
    }

    /// First line of the docs, which is what reporters show next to the name.
    pub fn short_description(&self) -> Option<&str> {
        self.doc().and_then(|doc| doc.lines().next())
    }

    pub fn body(&self) -> TestFn<S> {
        self.body
    }
}

impl<S> Clone for TestMethod<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            body: self.body,
        }
    }
}

impl<S> fmt::Debug for TestMethod<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A test class: its methods in declaration order plus their argument side-table.
pub struct Suite<S> {
    name: String,
    methods: Vec<TestMethod<S>>,
    table: ArgsTable,
}

impl<S> Suite<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            table: ArgsTable::new(),
        }
    }

    /// Add a test method.
    pub fn test(mut self, method: TestMethod<S>) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare the arguments `method` hands to the subject.
    pub fn declare(mut self, method: impl Into<String>, args: Args) -> Self {
        self.table.declare(method, args);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[TestMethod<S>] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&TestMethod<S>> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn args_table(&self) -> &ArgsTable {
        &self.table
    }
}

impl<S> fmt::Debug for Suite<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("table", &self.table)
            .finish()
    }
}

/// A subject type that knows its own test methods (implemented by `#[subject_case]`).
pub trait TestSuite: Subject + Sized {
    fn suite() -> Suite<Self>;
}
