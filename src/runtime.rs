//! Host-side counterpart of the generated runner's runtime contract.
//!
//! Generated headers call `RunTest(className, testName, callable)` and add
//! the returned [`TestState`] to a running total. [`run_test`] does the same
//! for Rust callables, so drivers and tests can aggregate results with the
//! same semantics.

use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

/// Failure and pass counts of one or more tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestState {
    pub fail_count: u32,
    pub pass_count: u32,
}

impl TestState {
    pub const PASSED: TestState = TestState {
        fail_count: 0,
        pass_count: 1,
    };
    pub const FAILED: TestState = TestState {
        fail_count: 1,
        pass_count: 0,
    };

    pub fn total(&self) -> u32 {
        self.fail_count + self.pass_count
    }

    pub fn is_success(&self) -> bool {
        self.fail_count == 0
    }
}

impl AddAssign for TestState {
    fn add_assign(&mut self, rhs: TestState) {
        self.fail_count += rhs.fail_count;
        self.pass_count += rhs.pass_count;
    }
}

impl Add for TestState {
    type Output = TestState;

    fn add(mut self, rhs: TestState) -> TestState {
        self += rhs;
        self
    }
}

impl Sum for TestState {
    fn sum<I: Iterator<Item = TestState>>(iter: I) -> TestState {
        iter.fold(TestState::default(), Add::add)
    }
}

/// Run one test and report it.
///
/// An `Err` return or a panic counts as one failure, anything else as one
/// pass. Panics are contained here and never reach the caller.
pub fn run_test<F, E>(class_name: &str, test_name: &str, test: F) -> TestState
where
    F: FnOnce() -> Result<(), E>,
    E: Display,
{
    info!(class = class_name, test = test_name, "running");
    match panic::catch_unwind(AssertUnwindSafe(test)) {
        Ok(Ok(())) => TestState::PASSED,
        Ok(Err(error)) => {
            warn!(class = class_name, test = test_name, %error, "test failed");
            TestState::FAILED
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(class = class_name, test = test_name, reason = message, "test panicked");
            TestState::FAILED
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_and_failure() {
        let passed = run_test("C", "ok", || Ok::<(), String>(()));
        assert_eq!(passed, TestState::PASSED);

        let failed = run_test("C", "err", || Err("boom".to_string()));
        assert_eq!(failed, TestState::FAILED);
    }

    #[test]
    fn test_panic_is_contained() {
        let state = run_test("C", "panics", || -> Result<(), String> {
            panic!("assertion failed")
        });
        assert_eq!(state, TestState::FAILED);
    }

    #[test]
    fn test_failure_does_not_stop_later_tests() {
        let mut ran = Vec::new();
        let mut state = TestState::default();
        for (index, name) in ["first", "panics", "errors", "last"].into_iter().enumerate() {
            state += run_test("Suite", name, || {
                ran.push(name);
                match index {
                    1 => panic!("{name} blew up"),
                    2 => Err(format!("{name} returned an error")),
                    _ => Ok(()),
                }
            });
        }
        assert_eq!(ran, ["first", "panics", "errors", "last"]);
        assert_eq!(
            state,
            TestState {
                fail_count: 2,
                pass_count: 2
            }
        );

        let mut state = TestState::default();
        for index in 0..5 {
            state += run_test("Suite", "case", || {
                if index == 0 {
                    Err("only the first fails")
                } else {
                    Ok(())
                }
            });
        }
        assert_eq!(
            state,
            TestState {
                fail_count: 1,
                pass_count: 4
            }
        );
    }

    #[test]
    fn test_states_accumulate() {
        let mut state = TestState::default();
        state += TestState::PASSED;
        state += TestState::FAILED;
        state += TestState::PASSED;
        assert_eq!(
            state,
            TestState {
                fail_count: 1,
                pass_count: 2
            }
        );
        assert_eq!(state.total(), 3);
        assert!(!state.is_success());

        let summed: TestState = [TestState::PASSED, TestState::PASSED].into_iter().sum();
        assert!(summed.is_success());
        assert_eq!(summed + TestState::FAILED, state);
    }
}
