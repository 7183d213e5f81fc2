//! Terminal observer and simulated biometric sensor

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use passlock_core::{BiometricAuthenticator, BiometricError, PasscodeLock, PasscodeLockObserver};

/// Prints lock events and remembers whether the flow completed
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    completed: AtomicBool,
}

impl ConsoleObserver {
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl PasscodeLockObserver for ConsoleObserver {
    fn on_success(&self, _lock: &PasscodeLock) {
        self.completed.store(true, Ordering::SeqCst);
        println!("Success");
    }

    fn on_failure(&self, lock: &PasscodeLock) {
        println!("Wrong passcode");
        print_screen(lock);
    }

    fn on_state_changed(&self, lock: &PasscodeLock) {
        print_screen(lock);
    }

    fn on_sign_added(&self, lock: &PasscodeLock, index: usize) {
        tracing::trace!(index, entered = lock.entered_count(), "Sign added");
    }

    fn on_sign_removed(&self, lock: &PasscodeLock, index: usize) {
        tracing::trace!(index, entered = lock.entered_count(), "Sign removed");
    }

    fn on_locked_out(&self, _lock: &PasscodeLock, remaining: Duration) {
        println!("Too many attempts, try again in {}s", remaining.as_secs());
    }
}

/// Print the title, description and entry progress
pub fn print_screen(lock: &PasscodeLock) {
    let state = lock.state();
    println!();
    println!("{}", state.title());
    println!("{}", state.description());
    print_progress(lock);
}

pub fn print_progress(lock: &PasscodeLock) {
    let entered = lock.entered_count();
    let empty = lock.passcode_length().saturating_sub(entered);
    println!(
        "[{}{}]  {}",
        "*".repeat(entered),
        "_".repeat(empty),
        lock.delete_key().label
    );
}

/// Behaviour of the simulated biometric sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BiometricsMode {
    /// No sensor
    None,
    /// Sensor that approves every request
    Approve,
    /// Sensor that rejects every request
    Deny,
}

/// Stand-in for a platform biometric sensor
#[derive(Debug)]
pub struct SimulatedAuthenticator {
    mode: BiometricsMode,
    latency: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(mode: BiometricsMode) -> Self {
        Self {
            mode,
            latency: Duration::from_millis(300),
        }
    }
}

#[async_trait]
impl BiometricAuthenticator for SimulatedAuthenticator {
    fn is_available(&self) -> bool {
        self.mode != BiometricsMode::None
    }

    async fn authenticate(&self, reason: &str) -> Result<(), BiometricError> {
        tracing::debug!(reason, mode = ?self.mode, "Simulated biometric prompt");
        tokio::time::sleep(self.latency).await;

        match self.mode {
            BiometricsMode::None => Err(BiometricError::NotAvailable),
            BiometricsMode::Approve => Ok(()),
            BiometricsMode::Deny => Err(BiometricError::Denied),
        }
    }
}
