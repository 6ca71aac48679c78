//! Suite runner (unittest-style)
//!
//! ## TestReporter Trait
//!
//! Execution and reporting are separate: [`run`] drives the per-test lifecycle and hands every event to a
//! [`TestReporter`]. [`ConsoleReporter`] prints dots or one line per test; [`RecordingReporter`] keeps the events
//! for inspection.
//!
//! ## Lifecycle
//!
//! Each test method gets a fresh fixture from the factory, then `set_up`, the bound body, and `tear_down` (also
//! after a failing or panicking body). Assertion failures count as *failed*; anything else (a raised exception, a
//! binding or usage error, a panic) counts as an *error*, matching unittest's `F` / `E` split.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::binder::{Suite, TestMethod, TestSuite};
use crate::case::{Case, Subject};
use crate::error::{CaseError, CaseResult};

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable enabling per-test output lines.
pub const ENV_VERBOSE: &str = "SUBCASE_VERBOSE";
/// Environment variable stopping the run at the first failure or error.
pub const ENV_FAIL_FAST: &str = "SUBCASE_FAIL_FAST";
/// Environment variable restricting the run to test names containing its value.
pub const ENV_FILTER: &str = "SUBCASE_FILTER";

/// Options for a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub fail_fast: bool,
    pub filter: Option<String>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Only run tests whose name contains `filter`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Read `SUBCASE_VERBOSE`, `SUBCASE_FAIL_FAST` and `SUBCASE_FILTER`.
    ///
    /// Flags accept `1`, `true`, `yes` or `on` (any case); an empty filter means no filter.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).is_some_and(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        };
        Self {
            verbose: flag(ENV_VERBOSE),
            fail_fast: flag(ENV_FAIL_FAST),
            filter: lookup(ENV_FILTER).filter(|raw| !raw.trim().is_empty()),
        }
    }

    fn selects(&self, name: &str) -> bool {
        self.filter.as_deref().is_none_or(|filter| name.contains(filter))
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Information about a collected test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    pub suite_name: String,
    pub method_name: String,
    pub description: Option<String>,
}

impl TestInfo {
    fn new<S>(suite: &Suite<S>, method: &TestMethod<S>) -> Self {
        Self {
            suite_name: suite.name().to_string(),
            method_name: method.name().to_string(),
            description: method.short_description().map(str::to_string),
        }
    }

    /// `test_name (SuiteName)`, as unittest prints it.
    pub fn label(&self) -> String {
        format!("{} ({})", self.method_name, self.suite_name)
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed(Duration),
    /// An assertion did not hold.
    Failed(Duration, String),
    /// The test raised or was misconfigured.
    Errored(Duration, String),
}

impl TestOutcome {
    fn from_result(duration: Duration, result: CaseResult) -> Self {
        match result {
            Ok(()) => TestOutcome::Passed(duration),
            Err(err) if err.is_assertion_failure() => TestOutcome::Failed(duration, err.to_string()),
            Err(err) => TestOutcome::Errored(duration, error_text(&err)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestOutcome::Passed(_))
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestOutcome::Passed(d) | TestOutcome::Failed(d, _) | TestOutcome::Errored(d, _) => *d,
        }
    }
}

fn error_text(err: &CaseError) -> String {
    match err {
        CaseError::Binding(binding) => format!("{binding}\n  caused by: {}", binding.cause().describe()),
        other => other.to_string(),
    }
}

/// Summary of test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    fn record(&mut self, outcome: &TestOutcome) {
        self.total += 1;
        match outcome {
            TestOutcome::Passed(_) => self.passed += 1,
            TestOutcome::Failed(..) => self.failed += 1,
            TestOutcome::Errored(..) => self.errors += 1,
        }
    }
}

/// Trait for reporting test execution results.
///
/// Implement this trait to customize output (JSON, TAP, etc.)
pub trait TestReporter {
    /// Called once the suite's tests are collected
    fn on_suite_start(&mut self, _suite_name: &str, _test_count: usize) {}

    /// Called when a test begins
    fn on_test_start(&mut self, test: &TestInfo);

    /// Called when a test completes
    fn on_test_complete(&mut self, test: &TestInfo, outcome: &TestOutcome);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

/// Default console reporter (unittest-style dots, or one line per test when verbose)
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    details: Vec<(String, String, String)>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            details: Vec::new(),
        }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_suite_start(&mut self, suite_name: &str, test_count: usize) {
        if test_count == 0 {
            eprintln!("No tests collected in {suite_name}");
        }
    }

    fn on_test_start(&mut self, test: &TestInfo) {
        if self.verbose {
            match &test.description {
                Some(description) => eprint!("{}\n{} ... ", test.label(), description),
                None => eprint!("{} ... ", test.label()),
            }
        }
    }

    fn on_test_complete(&mut self, test: &TestInfo, outcome: &TestOutcome) {
        let status = match outcome {
            TestOutcome::Passed(d) => {
                if self.verbose {
                    format!("\x1b[32mok\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[32m.\x1b[0m".to_string()
                }
            }
            TestOutcome::Failed(d, message) => {
                self.details.push(("FAIL".to_string(), test.label(), message.clone()));
                if self.verbose {
                    format!("\x1b[31mFAIL\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[31mF\x1b[0m".to_string()
                }
            }
            TestOutcome::Errored(d, message) => {
                self.details.push(("ERROR".to_string(), test.label(), message.clone()));
                if self.verbose {
                    format!("\x1b[31mERROR\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[31mE\x1b[0m".to_string()
                }
            }
        };

        if self.verbose {
            eprintln!("{status}");
        } else {
            eprint!("{status}");
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        if !self.verbose {
            eprintln!();
        }
        for (kind, label, message) in self.details.drain(..) {
            eprintln!("======================================================================");
            eprintln!("\x1b[31m{kind}\x1b[0m: {label}");
            eprintln!("----------------------------------------------------------------------");
            eprintln!("{message}");
        }
        eprintln!("----------------------------------------------------------------------");
        eprintln!(
            "Ran {} test{} in {:.3}s",
            summary.total,
            if summary.total == 1 { "" } else { "s" },
            summary.duration.as_secs_f64()
        );
        eprintln!();

        if summary.is_success() {
            eprintln!("\x1b[32mOK\x1b[0m");
        } else {
            let mut parts = Vec::new();
            if summary.failed > 0 {
                parts.push(format!("failures={}", summary.failed));
            }
            if summary.errors > 0 {
                parts.push(format!("errors={}", summary.errors));
            }
            eprintln!("\x1b[31mFAILED\x1b[0m ({})", parts.join(", "));
        }
    }
}

/// Reporter that stores every event, for programmatic inspection.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub started: Vec<TestInfo>,
    pub completed: Vec<(TestInfo, TestOutcome)>,
    pub summary: Option<TestSummary>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome recorded for `method_name`, if it ran.
    pub fn outcome(&self, method_name: &str) -> Option<&TestOutcome> {
        self.completed
            .iter()
            .find(|(info, _)| info.method_name == method_name)
            .map(|(_, outcome)| outcome)
    }
}

impl TestReporter for RecordingReporter {
    fn on_test_start(&mut self, test: &TestInfo) {
        self.started.push(test.clone());
    }

    fn on_test_complete(&mut self, test: &TestInfo, outcome: &TestOutcome) {
        self.completed.push((test.clone(), outcome.clone()));
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        self.summary = Some(summary.clone());
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run one test method on a fresh fixture: `set_up`, the bound body, `tear_down`.
///
/// A failing `set_up` skips the body and `tear_down`, as in unittest. The body's error wins over a `tear_down`
/// error. A panicking body becomes [`CaseError::Panicked`] and `tear_down` still runs.
pub fn run_test<S: Subject>(fixture: S, suite: &Suite<S>, method: &TestMethod<S>) -> CaseResult {
    let mut case = Case::new(fixture);
    case.fixture_mut().set_up()?;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| case.call_test_method(method, suite.args_table())))
        .unwrap_or_else(|payload| {
            case.unbind();
            let message = panic_message(payload.as_ref());
            tracing::debug!(test = method.name(), %message, "test body panicked");
            Err(CaseError::Panicked(message))
        });
    let teardown = case.fixture_mut().tear_down();
    outcome.and(teardown)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Run every selected test in `suite`, building each fixture with `factory`.
pub fn run<S: Subject>(
    suite: &Suite<S>,
    factory: impl Fn() -> S,
    config: &RunConfig,
    reporter: &mut dyn TestReporter,
) -> TestSummary {
    let start_time = Instant::now();
    let selected: Vec<&TestMethod<S>> = suite.methods().iter().filter(|m| config.selects(m.name())).collect();
    tracing::info!(suite = suite.name(), tests = selected.len(), "running suite");
    reporter.on_suite_start(suite.name(), selected.len());

    let mut summary = TestSummary::default();
    for method in selected {
        let info = TestInfo::new(suite, method);
        reporter.on_test_start(&info);

        let started = Instant::now();
        let result = run_test(factory(), suite, method);
        let outcome = TestOutcome::from_result(started.elapsed(), result);
        tracing::debug!(test = %info.label(), success = outcome.is_success(), "test finished");

        summary.record(&outcome);
        reporter.on_test_complete(&info, &outcome);
        if config.fail_fast && !outcome.is_success() {
            tracing::info!(test = %info.label(), "stopping after first failure");
            break;
        }
    }

    summary.duration = start_time.elapsed();
    reporter.on_run_complete(&summary);
    summary
}

/// Run a `#[subject_case]` suite with default-constructed fixtures and a console reporter.
pub fn run_suite<S: TestSuite + Default>(config: &RunConfig) -> TestSummary {
    let mut reporter = ConsoleReporter::new(config.verbose);
    run(&S::suite(), S::default, config, &mut reporter)
}

/// Install a `tracing` subscriber writing to the libtest capture, filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call from every test: only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Run suite `S` from a libtest `#[test]`, configured from the environment, and panic if anything failed.
///
/// # Panics
///
/// Panics with the failure and error counts when the suite is not successful.
pub fn assert_suite_passes<S: TestSuite + Default>() {
    init_tracing();
    let summary = run_suite::<S>(&RunConfig::from_env());
    if !summary.is_success() {
        panic!(
            "suite failed: {} failed, {} errors out of {} tests",
            summary.failed, summary.errors, summary.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{Args, Suite};
    use crate::error::UsageError;
    use crate::host::asserts;
    use subcase_core::{BoundCall, Exception, Signature, Value, ops};

    #[derive(Debug, Default)]
    struct Doubler {
        set_up_calls: usize,
        torn_down: Option<std::rc::Rc<std::cell::Cell<usize>>>,
    }

    impl Subject for Doubler {
        fn signature(&self) -> Signature {
            Signature::new().param("x")
        }

        fn call(&mut self, args: BoundCall) -> Result<Value, Exception> {
            ops::mul(args.get("x")?, &Value::from(2))
        }

        fn set_up(&mut self) -> CaseResult {
            self.set_up_calls += 1;
            Ok(())
        }

        fn tear_down(&mut self) -> CaseResult {
            if let Some(count) = &self.torn_down {
                count.set(count.get() + 1);
            }
            Ok(())
        }
    }

    fn passes(case: &mut Case<Doubler>) -> CaseResult {
        asserts::assert_equal(&case.result()?, &Value::from(6))?;
        asserts::assert_equal(&Value::from(case.set_up_calls), &Value::from(1))
    }

    fn fails(case: &mut Case<Doubler>) -> CaseResult {
        asserts::assert_equal(&case.result()?, &Value::from(5))
    }

    fn errors(case: &mut Case<Doubler>) -> CaseResult {
        case.cached_result().map(|_| ())
    }

    fn suite() -> Suite<Doubler> {
        Suite::new("TestDoubler")
            .test(TestMethod::new("test_passes", passes).with_doc("Doubles three.\nMore text."))
            .declare("test_passes", Args::new().arg(3))
            .test(TestMethod::new("test_fails", fails))
            .declare("test_fails", Args::new().arg(3))
            .test(TestMethod::new("test_errors", errors))
    }

    #[test]
    fn test_outcomes_are_classified() {
        let mut reporter = RecordingReporter::new();
        let summary = run(&suite(), Doubler::default, &RunConfig::new(), &mut reporter);

        assert_eq!(summary.total, 3);
        assert_eq!((summary.passed, summary.failed, summary.errors), (1, 1, 1));
        assert!(!summary.is_success());
        assert!(matches!(reporter.outcome("test_passes"), Some(TestOutcome::Passed(_))));
        let Some(TestOutcome::Failed(_, message)) = reporter.outcome("test_fails") else {
            panic!("expected a failure outcome");
        };
        assert_eq!(message, "6 != 5");
        let Some(TestOutcome::Errored(_, message)) = reporter.outcome("test_errors") else {
            panic!("expected an error outcome");
        };
        assert_eq!(message, &UsageError::NoResultYet.to_string());
        assert_eq!(reporter.summary.as_ref(), Some(&summary));
    }

    #[test]
    fn test_description_is_first_doc_line() {
        let mut reporter = RecordingReporter::new();
        run(&suite(), Doubler::default, &RunConfig::new().filter("passes"), &mut reporter);
        assert_eq!(reporter.started.len(), 1);
        assert_eq!(reporter.started[0].description.as_deref(), Some("Doubles three."));
        assert_eq!(reporter.started[0].label(), "test_passes (TestDoubler)");
    }

    #[test]
    fn test_fail_fast_stops_after_first_problem() {
        let mut reporter = RecordingReporter::new();
        let summary = run(&suite(), Doubler::default, &RunConfig::new().fail_fast(true), &mut reporter);
        assert_eq!(summary.total, 2);
        assert!(reporter.outcome("test_errors").is_none());
    }

    fn panics(case: &mut Case<Doubler>) -> CaseResult {
        assert_eq!(case.result()?, Value::from(7), "doubled value");
        Ok(())
    }

    #[test]
    fn test_panicking_body_is_an_error_and_run_continues() {
        let suite = Suite::new("TestPanics")
            .test(TestMethod::new("test_panics", panics))
            .declare("test_panics", Args::new().arg(3))
            .test(TestMethod::new("test_passes", passes))
            .declare("test_passes", Args::new().arg(3));
        let torn_down = std::rc::Rc::new(std::cell::Cell::new(0));
        let factory = || Doubler {
            torn_down: Some(std::rc::Rc::clone(&torn_down)),
            ..Doubler::default()
        };

        let mut reporter = RecordingReporter::new();
        let summary = run(&suite, factory, &RunConfig::new(), &mut reporter);

        assert_eq!((summary.total, summary.passed, summary.errors), (2, 1, 1));
        let Some(TestOutcome::Errored(_, message)) = reporter.outcome("test_panics") else {
            panic!("expected an error outcome");
        };
        assert!(message.starts_with("test panicked: assertion `left == right` failed: doubled value"));
        assert!(matches!(reporter.outcome("test_passes"), Some(TestOutcome::Passed(_))));
        assert_eq!(torn_down.get(), 2);
        assert!(reporter.summary.is_some());
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[test]
    fn test_config_from_lookup() {
        let config = RunConfig::from_lookup(|key| match key {
            ENV_VERBOSE => Some("TRUE".to_string()),
            ENV_FAIL_FAST => Some("0".to_string()),
            ENV_FILTER => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config, RunConfig::new().verbose(true));

        let config = RunConfig::from_lookup(|key| (key == ENV_FILTER).then(|| "add".to_string()));
        assert!(config.selects("test_add_ints"));
        assert!(!config.selects("test_append"));
    }
}
