//! Results of running a script's `test_*` functions.

use std::time::Duration;

/// Outcome of a single test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// Failed with the rendered error (message plus traceback).
    Failed(String),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(_))
    }
}

#[derive(Clone, Debug)]
pub struct TestResult {
    pub name: String,
    pub outcome: TestOutcome,
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(name: &str, duration: Duration) -> Self {
        TestResult {
            name: name.to_string(),
            outcome: TestOutcome::Passed,
            duration,
        }
    }

    #[cold]
    pub fn failed(name: &str, error: String, duration: Duration) -> Self {
        TestResult {
            name: name.to_string(),
            outcome: TestOutcome::Failed(error),
            duration,
        }
    }
}

/// Summary of one run over a loaded config.
#[derive(Clone, Debug, Default)]
pub struct TestSummary {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn new() -> Self {
        TestSummary::default()
    }

    pub fn add_result(&mut self, result: TestResult) {
        match &result.outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed(_) => self.failed += 1,
        }
        self.duration += result.duration;
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// 0 = all pass, 1 = failures, 2 = no tests found.
    pub fn exit_code(&self) -> i32 {
        if self.total() == 0 {
            2
        } else {
            i32::from(self.has_failures())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let mut summary = TestSummary::new();
        assert_eq!(summary.exit_code(), 2);

        summary.add_result(TestResult::passed("test_a", Duration::from_millis(2)));
        assert_eq!(summary.exit_code(), 0);

        summary.add_result(TestResult::failed(
            "test_b",
            "fail: boom".to_string(),
            Duration::from_millis(3),
        ));
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.duration, Duration::from_millis(5));
        assert!(summary.results[1].outcome.is_failed());
    }
}
