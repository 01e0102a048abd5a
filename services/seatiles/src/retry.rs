//! Bounded retry with exponential backoff.

use crate::error::RetrievalError;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry opening a grid file.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt (doubles each retry).
    pub initial_delay: Duration,
    /// Upper bound on a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, for `attempt >= 1`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or the attempts run
    /// out. `sleep` is called between attempts with the backoff delay.
    ///
    /// Only transient errors are retried; after the last attempt the result
    /// is `RetrievalError::Exhausted`.
    pub fn run<T>(
        &self,
        path: &Path,
        mut sleep: impl FnMut(Duration),
        mut op: impl FnMut() -> Result<T, RetrievalError>,
    ) -> Result<T, RetrievalError> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if attempt >= max_attempts {
                        return Err(RetrievalError::Exhausted {
                            path: path.to_path_buf(),
                            attempts: attempt,
                            last: e.to_string(),
                        });
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        path = %path.display(),
                        error = %e,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Failed to open grid, retrying"
                    );
                    sleep(delay);
                }
            }
        }
    }
}
