/// Consecutive-failure budget for a polling loop.
///
/// Failures are counted until `max_attempts` is reached, at which point the
/// caller is told to report and the counter resets. Any success resets the
/// counter. The policy never stops the loop; it only paces the reporting.
#[derive(Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    failures: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            failures: 0,
        }
    }

    /// Returns true when the failure budget is exhausted; the counter resets
    /// so the next run of failures is counted from scratch.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        if self.failures >= self.max_attempts {
            self.failures = 0;
            return true;
        }
        false
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
