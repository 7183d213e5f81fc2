//! Attempt limit for the verifying states
//!
//! Retry is unlimited unless the configuration carries a [`LockoutPolicy`].
//! With one, the lock wraps the failure path of the enter and change states
//! in a [`LockoutGuard`]. Once `threshold` wrong passcodes in a row have been
//! entered, every further one pauses entry for the next cooldown in the list;
//! past the end of the list the last cooldown repeats.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Cooldown schedule for wrong passcodes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutPolicy {
    /// Wrong passcodes in a row that start the first cooldown
    pub threshold: u32,
    /// Cooldowns in seconds, one per failure from `threshold` on
    pub lockout_durations: Vec<u64>,
}

impl Default for LockoutPolicy {
    /// Phone-style schedule: five free tries, then 1, 5, 15 and 60 minutes
    fn default() -> Self {
        Self {
            threshold: 5,
            lockout_durations: vec![60, 5 * 60, 15 * 60, 60 * 60],
        }
    }
}

impl LockoutPolicy {
    /// Three tries, then long cooldowns
    pub fn strict() -> Self {
        Self {
            threshold: 3,
            lockout_durations: vec![60, 10 * 60, 60 * 60],
        }
    }

    /// Ten tries, then short cooldowns
    pub fn lenient() -> Self {
        Self {
            threshold: 10,
            lockout_durations: vec![30, 2 * 60, 10 * 60],
        }
    }

    /// Cooldown started by the `failed_attempts`-th wrong passcode in a row
    pub fn lockout_duration(&self, failed_attempts: u32) -> Option<Duration> {
        let step = failed_attempts.checked_sub(self.threshold)? as usize;
        self.lockout_durations
            .get(step)
            .or_else(|| self.lockout_durations.last())
            .map(|&secs| Duration::from_secs(secs))
    }

    /// Wrong passcodes still allowed before the first cooldown
    pub fn attempts_remaining(&self, failed_attempts: u32) -> u32 {
        self.threshold.saturating_sub(failed_attempts)
    }

    /// Lock screen text after `failed_attempts` wrong passcodes in a row
    pub fn describe_lockout(&self, failed_attempts: u32) -> String {
        match self.lockout_duration(failed_attempts) {
            Some(cooldown) => format!("Try again in {}", format_cooldown(cooldown)),
            None => match self.attempts_remaining(failed_attempts) {
                1 => "1 attempt left".to_string(),
                n => format!("{} attempts left", n),
            },
        }
    }
}

/// Largest whole unit of a cooldown ("45 seconds", "1 minute", "2 hours")
fn format_cooldown(cooldown: Duration) -> String {
    let secs = cooldown.as_secs();
    let (count, unit) = match secs {
        0..=59 => (secs, "second"),
        60..=3599 => (secs / 60, "minute"),
        _ => (secs / 3600, "hour"),
    };
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Failure counter wrapped around the verifying states
#[derive(Clone, Debug)]
pub struct LockoutGuard {
    policy: LockoutPolicy,
    failed_attempts: u32,
    locked_until: Option<Instant>,
}

impl LockoutGuard {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            failed_attempts: 0,
            locked_until: None,
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Consecutive failures since the last success
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Record a wrong passcode; returns the cooldown it started, if any
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        let duration = self.policy.lockout_duration(self.failed_attempts)?;
        self.locked_until = Some(Instant::now() + duration);
        tracing::warn!(
            failed_attempts = self.failed_attempts,
            cooldown_secs = duration.as_secs(),
            "Passcode entry paused"
        );
        Some(duration)
    }

    /// Record a correct passcode
    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
        self.locked_until = None;
    }

    /// End of the current cooldown, if one is running
    pub fn locked_until(&self) -> Option<Instant> {
        self.locked_until.filter(|&until| Instant::now() < until)
    }

    /// Time left in the current cooldown
    pub fn remaining(&self) -> Option<Duration> {
        self.locked_until()
            .map(|until| until.saturating_duration_since(Instant::now()))
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_tries_below_threshold() {
        let policy = LockoutPolicy::default();
        assert!(policy.lockout_duration(0).is_none());
        assert!(policy.lockout_duration(4).is_none());
        assert_eq!(policy.attempts_remaining(4), 1);
    }

    #[test]
    fn test_default_schedule_repeats_last_cooldown() {
        let policy = LockoutPolicy::default();
        let secs = |n| policy.lockout_duration(n).map(|d| d.as_secs());

        assert_eq!(secs(5), Some(60));
        assert_eq!(secs(6), Some(300));
        assert_eq!(secs(7), Some(900));
        assert_eq!(secs(8), Some(3600));
        assert_eq!(secs(50), Some(3600));
    }

    #[test]
    fn test_presets_order() {
        let strict = LockoutPolicy::strict();
        let lenient = LockoutPolicy::lenient();
        assert!(strict.threshold < LockoutPolicy::default().threshold);
        assert!(lenient.threshold > LockoutPolicy::default().threshold);
    }

    #[test]
    fn test_empty_schedule_never_pauses() {
        let policy = LockoutPolicy {
            threshold: 1,
            lockout_durations: vec![],
        };
        assert!(policy.lockout_duration(5).is_none());
    }

    #[test]
    fn test_lock_screen_text() {
        let policy = LockoutPolicy::strict();
        assert_eq!(policy.describe_lockout(0), "3 attempts left");
        assert_eq!(policy.describe_lockout(2), "1 attempt left");
        assert_eq!(policy.describe_lockout(3), "Try again in 1 minute");
        assert_eq!(policy.describe_lockout(4), "Try again in 10 minutes");
        assert_eq!(policy.describe_lockout(5), "Try again in 1 hour");

        let short = LockoutPolicy {
            threshold: 1,
            lockout_durations: vec![45],
        };
        assert_eq!(short.describe_lockout(1), "Try again in 45 seconds");
    }

    #[test]
    fn test_guard_pauses_at_threshold() {
        let mut guard = LockoutGuard::new(LockoutPolicy::strict());

        assert!(guard.record_failure().is_none());
        assert!(guard.record_failure().is_none());
        assert!(!guard.is_locked());

        assert_eq!(guard.record_failure(), Some(Duration::from_secs(60)));
        assert!(guard.is_locked());
        assert!(guard.remaining().unwrap() <= Duration::from_secs(60));
    }

    #[test]
    fn test_guard_success_resets() {
        let mut guard = LockoutGuard::new(LockoutPolicy::strict());
        for _ in 0..3 {
            guard.record_failure();
        }
        guard.record_success();

        assert_eq!(guard.failed_attempts(), 0);
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_zero_duration_cooldown_expires() {
        let mut guard = LockoutGuard::new(LockoutPolicy {
            threshold: 1,
            lockout_durations: vec![0],
        });
        assert_eq!(guard.record_failure(), Some(Duration::ZERO));
        assert!(!guard.is_locked());
    }
}
