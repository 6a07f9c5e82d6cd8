//! Retry and fallback-routing policy for caption fetches.

use super::Route;
use std::time::Duration;

/// Bounds for the fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first direct one.
    pub max_retries: u32,
    /// Wait between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Where the fetch loop stands.
///
/// ```text
/// DirectAttempt --transient--> ProxiedAttempt{2} --transient--> ... --> Exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// First attempt, over the direct route.
    DirectAttempt,
    /// A retry through the proxy. `attempt` is 1-based across the whole loop.
    ProxiedAttempt { attempt: u32 },
    /// No attempts left.
    Exhausted,
}

impl AttemptState {
    /// Initial state for a loop of `max_retries` attempts.
    pub fn start(max_retries: u32) -> Self {
        if max_retries == 0 {
            AttemptState::Exhausted
        } else {
            AttemptState::DirectAttempt
        }
    }

    /// State after the current attempt failed with a transient error.
    pub fn after_transient_failure(self, max_retries: u32) -> Self {
        let completed = match self.attempt_number() {
            Some(n) => n,
            None => return AttemptState::Exhausted,
        };

        if completed >= max_retries {
            AttemptState::Exhausted
        } else {
            AttemptState::ProxiedAttempt {
                attempt: completed + 1,
            }
        }
    }

    /// Route for the attempt this state represents.
    pub fn route(&self) -> Option<Route> {
        match self {
            AttemptState::DirectAttempt => Some(Route::Direct),
            AttemptState::ProxiedAttempt { .. } => Some(Route::Proxied),
            AttemptState::Exhausted => None,
        }
    }

    /// 1-based attempt number, `None` once exhausted.
    pub fn attempt_number(&self) -> Option<u32> {
        match self {
            AttemptState::DirectAttempt => Some(1),
            AttemptState::ProxiedAttempt { attempt } => Some(*attempt),
            AttemptState::Exhausted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_direct() {
        let state = AttemptState::start(3);
        assert_eq!(state, AttemptState::DirectAttempt);
        assert_eq!(state.route(), Some(Route::Direct));
        assert_eq!(state.attempt_number(), Some(1));
    }

    #[test]
    fn test_retries_go_through_proxy() {
        let s1 = AttemptState::start(3);
        let s2 = s1.after_transient_failure(3);
        let s3 = s2.after_transient_failure(3);
        let s4 = s3.after_transient_failure(3);

        assert_eq!(s2, AttemptState::ProxiedAttempt { attempt: 2 });
        assert_eq!(s2.route(), Some(Route::Proxied));
        assert_eq!(s3, AttemptState::ProxiedAttempt { attempt: 3 });
        assert_eq!(s4, AttemptState::Exhausted);
        assert_eq!(s4.route(), None);
    }

    #[test]
    fn test_single_attempt_never_proxies() {
        let state = AttemptState::start(1);
        assert_eq!(state.after_transient_failure(1), AttemptState::Exhausted);
    }

    #[test]
    fn test_exhausted_is_terminal() {
        assert_eq!(AttemptState::start(0), AttemptState::Exhausted);
        assert_eq!(
            AttemptState::Exhausted.after_transient_failure(10),
            AttemptState::Exhausted
        );
    }

    #[test]
    fn test_policy_clamps_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::from_millis(5));
        assert_eq!(policy.max_retries, 1);
        assert_eq!(RetryPolicy::default().delay, Duration::from_secs(2));
    }
}
