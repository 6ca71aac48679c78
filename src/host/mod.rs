//! Minimal host test framework: unittest-shaped assertion primitives and a suite runner.

pub mod asserts;
pub mod runner;

pub use asserts::{AssertResultExt, Tolerance};
pub use runner::{
    ConsoleReporter, RecordingReporter, RunConfig, TestInfo, TestOutcome, TestReporter, TestSummary,
    assert_suite_passes, init_tracing, run, run_suite, run_test,
};
