//! The passcode lock engine
//!
//! [`PasscodeLock`] owns the current state and the entered-sign buffer. The
//! UI forwards each key press; once the buffer holds a full passcode the
//! current state decides what it means and the lock applies that decision,
//! reporting every step to a [`PasscodeLockObserver`].
//!
//! The lock is driven from a single thread of control. The only asynchronous
//! path is biometrics, see [`PasscodeLock::authenticate_with_biometrics`].

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use zeroize::Zeroize;

use crate::biometric::{BiometricAuthenticator, BiometricOutcome, BiometricPrompt};
use crate::config::PasscodeLockConfiguration;
use crate::error::{LockError, Result};
use crate::lockout::LockoutGuard;
use crate::repository::PasscodeRepository;
use crate::sign::{Passcode, PasscodeSign};
use crate::state::{Decision, LockMode, PasscodeLockState};
use crate::strings::{DisplayStrings, StringKey};

/// Listener for lock events
///
/// The lock holds observers weakly: once the observer is dropped it simply
/// stops receiving events.
pub trait PasscodeLockObserver: Send + Sync {
    /// The flow completed (correct passcode, confirmed passcode or biometrics)
    fn on_success(&self, lock: &PasscodeLock);

    /// A completed entry was wrong
    fn on_failure(&self, lock: &PasscodeLock);

    /// The lock moved to a new state
    fn on_state_changed(&self, lock: &PasscodeLock);

    /// A sign was appended at `index`
    fn on_sign_added(&self, lock: &PasscodeLock, index: usize);

    /// The sign at `index` was removed
    fn on_sign_removed(&self, lock: &PasscodeLock, index: usize);

    /// Entry is paused after repeated failures
    fn on_locked_out(&self, _lock: &PasscodeLock, _remaining: Duration) {}
}

/// Role of the cancel/delete key for the current buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    /// Dismiss the lock screen
    Cancel,
    /// Remove the last sign
    Delete,
}

/// How the cancel/delete key should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteKey {
    pub action: DeleteAction,
    pub label: String,
    pub enabled: bool,
}

/// Effect of pressing the cancel/delete key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKeyTap {
    /// The caller should dismiss the lock screen
    Dismiss,
    /// The last sign was removed
    Removed,
    /// Nothing to remove and the state cannot be cancelled
    Ignored,
}

/// Passcode lock engine
pub struct PasscodeLock {
    /// Current state (replaced on transition)
    state: PasscodeLockState,
    /// Options the lock was presented with
    configuration: PasscodeLockConfiguration,
    /// Signs entered so far
    entered: Vec<PasscodeSign>,
    /// Passcode store (shared with the caller)
    repository: Arc<dyn PasscodeRepository>,
    /// Biometric shortcut, if the platform has one
    authenticator: Option<Arc<dyn BiometricAuthenticator>>,
    /// Event listener
    observer: Option<Weak<dyn PasscodeLockObserver>>,
    /// Attempt limit around the verifying states
    lockout: Option<LockoutGuard>,
    /// Bumped whenever outstanding biometric answers become stale
    generation: u64,
    /// Generation of the biometric request in flight
    pending_biometric: Option<u64>,
    biometric_tx: mpsc::UnboundedSender<BiometricOutcome>,
    biometric_rx: mpsc::UnboundedReceiver<BiometricOutcome>,
}

impl PasscodeLock {
    /// Create a lock starting in `state`
    ///
    /// Fails with [`LockError::PasscodeNotSet`] when `state` verifies against
    /// a passcode the repository does not hold.
    pub fn new(
        state: PasscodeLockState,
        configuration: PasscodeLockConfiguration,
        repository: Arc<dyn PasscodeRepository>,
    ) -> Result<Self> {
        configuration.validate()?;

        if state.is_verifying() && !repository.has_passcode() {
            return Err(LockError::PasscodeNotSet);
        }

        let lockout = configuration.lockout.clone().map(LockoutGuard::new);
        let (biometric_tx, biometric_rx) = mpsc::unbounded_channel();

        tracing::debug!(
            state = ?state.kind(),
            passcode_length = configuration.passcode_length,
            "Passcode lock created"
        );

        Ok(Self {
            state,
            configuration,
            entered: Vec::new(),
            repository,
            authenticator: None,
            observer: None,
            lockout,
            generation: 0,
            pending_biometric: None,
            biometric_tx,
            biometric_rx,
        })
    }

    /// Create a lock for a presentation mode
    pub fn for_mode(
        mode: LockMode,
        configuration: PasscodeLockConfiguration,
        repository: Arc<dyn PasscodeRepository>,
    ) -> Result<Self> {
        let state = mode.initial_state(&configuration);
        Self::new(state, configuration, repository)
    }

    /// Attach a biometric authenticator
    pub fn with_authenticator(mut self, authenticator: Arc<dyn BiometricAuthenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Register the observer (held weakly)
    pub fn set_observer<O: PasscodeLockObserver + 'static>(&mut self, observer: &Arc<O>) {
        let observer: Weak<O> = Arc::downgrade(observer);
        self.observer = Some(observer);
    }

    pub fn state(&self) -> &PasscodeLockState {
        &self.state
    }

    pub fn configuration(&self) -> &PasscodeLockConfiguration {
        &self.configuration
    }

    pub fn repository(&self) -> &Arc<dyn PasscodeRepository> {
        &self.repository
    }

    pub fn passcode_length(&self) -> usize {
        self.configuration.passcode_length
    }

    /// Number of signs entered so far
    pub fn entered_count(&self) -> usize {
        self.entered.len()
    }

    pub fn is_pincode_empty(&self) -> bool {
        self.entered.is_empty()
    }

    /// Time left before entry is accepted again
    pub fn lockout_remaining(&self) -> Option<Duration> {
        self.lockout.as_ref().and_then(LockoutGuard::remaining)
    }

    /// Append a sign; decides once the passcode is complete
    ///
    /// A call while the buffer is already full is ignored.
    pub fn add_sign(&mut self, sign: PasscodeSign) -> Result<()> {
        if let Some(remaining) = self.lockout_remaining() {
            return Err(LockError::LockedOut {
                remaining_secs: ceil_secs(remaining),
            });
        }

        let length = self.configuration.passcode_length;
        if self.entered.len() >= length {
            return Ok(());
        }

        self.entered.push(sign);
        let index = self.entered.len() - 1;
        self.notify(|observer, lock| observer.on_sign_added(lock, index));

        if self.entered.len() == length {
            let passcode = Passcode::from_signs(std::mem::take(&mut self.entered));
            self.decide(&passcode)?;
        }

        Ok(())
    }

    /// Remove the last sign; no-op on an empty buffer
    pub fn remove_sign(&mut self) {
        if let Some(mut sign) = self.entered.pop() {
            sign.zeroize();
            let index = self.entered.len();
            self.notify(|observer, lock| observer.on_sign_removed(lock, index));
        }
    }

    /// Replace the current state
    pub fn change_state_to(&mut self, state: PasscodeLockState) {
        tracing::debug!(from = ?self.state.kind(), to = ?state.kind(), "Passcode lock state change");

        self.entered.zeroize();
        self.state = state;
        self.invalidate_biometrics();
        self.notify(|observer, lock| observer.on_state_changed(lock));
    }

    /// Whether the biometric shortcut applies right now
    pub fn is_touch_id_allowed(&self) -> bool {
        self.configuration.biometrics_allowed
            && self.state.is_touch_id_allowed()
            && self
                .authenticator
                .as_ref()
                .is_some_and(|authenticator| authenticator.is_available())
    }

    /// Whether the UI should prompt for biometrics as soon as it appears
    pub fn should_request_biometrics_immediately(&self) -> bool {
        self.configuration.request_biometrics_immediately && self.is_touch_id_allowed()
    }

    /// Issue a biometric request
    ///
    /// Returns None (and never touches the authenticator) when biometrics do
    /// not apply to the current state or a request is already in flight. The
    /// caller runs the returned prompt and then feeds the answer back with
    /// [`process_biometric_outcomes`](Self::process_biometric_outcomes) or
    /// [`next_biometric_outcome`](Self::next_biometric_outcome).
    /// A prompt dropped without being run counts as cancelled.
    pub fn authenticate_with_biometrics(
        &mut self,
        strings: Option<&DisplayStrings>,
    ) -> Option<BiometricPrompt> {
        if !self.is_touch_id_allowed() {
            tracing::debug!(state = ?self.state.kind(), "Biometrics not allowed");
            return None;
        }

        if self.pending_biometric.is_some() {
            tracing::warn!("Biometric request already in flight");
            return None;
        }

        let authenticator = self.authenticator.clone()?;
        let reason = strings
            .unwrap_or(&self.configuration.strings)
            .resolve(StringKey::BiometricReason);

        self.pending_biometric = Some(self.generation);
        Some(BiometricPrompt::new(
            authenticator,
            reason,
            self.generation,
            self.biometric_tx.clone(),
        ))
    }

    /// Apply biometric answers that have already arrived
    pub fn process_biometric_outcomes(&mut self) -> Result<()> {
        while let Ok(outcome) = self.biometric_rx.try_recv() {
            self.apply_biometric_outcome(outcome)?;
        }
        Ok(())
    }

    /// Wait for the answer to the request in flight and apply it
    ///
    /// Returns immediately when no request is pending.
    pub async fn next_biometric_outcome(&mut self) -> Result<()> {
        while self.pending_biometric.is_some() {
            match self.biometric_rx.recv().await {
                Some(outcome) => self.apply_biometric_outcome(outcome)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Drop the lock's pending work before the screen goes away
    ///
    /// Biometric answers that arrive afterwards are ignored.
    pub fn tear_down(&mut self) {
        self.entered.zeroize();
        self.invalidate_biometrics();
        tracing::debug!("Passcode lock torn down");
    }

    /// How the cancel/delete key should look for the current buffer
    pub fn delete_key(&self) -> DeleteKey {
        let strings = &self.configuration.strings;
        let cancellable = self.state.is_cancellable_action();
        let empty = self.is_pincode_empty();

        let action = if cancellable && empty {
            DeleteAction::Cancel
        } else {
            DeleteAction::Delete
        };
        let label = match action {
            DeleteAction::Cancel => strings.resolve(StringKey::Cancel),
            DeleteAction::Delete => strings.resolve(StringKey::Delete),
        };

        DeleteKey {
            action,
            label,
            enabled: !(empty && !cancellable),
        }
    }

    /// Press the cancel/delete key
    pub fn tap_delete(&mut self) -> DeleteKeyTap {
        if !self.is_pincode_empty() {
            self.remove_sign();
            DeleteKeyTap::Removed
        } else if self.state.is_cancellable_action() {
            DeleteKeyTap::Dismiss
        } else {
            DeleteKeyTap::Ignored
        }
    }

    fn decide(&mut self, passcode: &Passcode) -> Result<()> {
        let verifying = self.state.is_verifying();
        let decision = self.state.accept_passcode(
            passcode,
            self.repository.as_ref(),
            &self.configuration.strings,
        )?;

        match decision {
            Decision::Succeeded => {
                if verifying {
                    self.reset_lockout();
                }
                self.succeed();
            }
            Decision::Failed => self.fail(verifying),
            Decision::Transition(next) => {
                if verifying {
                    self.reset_lockout();
                }
                self.change_state_to(next);
            }
            Decision::FailedWithTransition(next) => {
                self.change_state_to(next);
                self.fail(false);
            }
        }

        Ok(())
    }

    fn succeed(&mut self) {
        self.entered.zeroize();
        self.invalidate_biometrics();
        tracing::info!(state = ?self.state.kind(), "Passcode lock succeeded");
        self.notify(|observer, lock| observer.on_success(lock));
    }

    fn fail(&mut self, verifying: bool) {
        tracing::debug!(state = ?self.state.kind(), "Passcode rejected");

        let cooldown = if verifying {
            self.lockout.as_mut().and_then(LockoutGuard::record_failure)
        } else {
            None
        };

        self.notify(|observer, lock| observer.on_failure(lock));
        if let Some(remaining) = cooldown {
            self.notify(|observer, lock| observer.on_locked_out(lock, remaining));
        }
    }

    fn reset_lockout(&mut self) {
        if let Some(guard) = self.lockout.as_mut() {
            guard.record_success();
        }
    }

    fn invalidate_biometrics(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending_biometric = None;
    }

    fn apply_biometric_outcome(&mut self, outcome: BiometricOutcome) -> Result<()> {
        if self.pending_biometric != Some(outcome.generation) {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "Ignoring stale biometric outcome"
            );
            return Ok(());
        }
        self.pending_biometric = None;

        match outcome.result {
            Ok(()) => {
                if let PasscodeLockState::Enter(state) = &self.state {
                    state.complete(self.repository.as_ref())?;
                }
                self.reset_lockout();
                self.succeed();
            }
            Err(e) => {
                // Not a wrong passcode: manual entry stays available
                tracing::debug!("Biometric authentication did not succeed: {}", e);
            }
        }

        Ok(())
    }

    fn notify(&self, event: impl FnOnce(&dyn PasscodeLockObserver, &PasscodeLock)) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            event(observer.as_ref(), self);
        }
    }
}

impl Drop for PasscodeLock {
    fn drop(&mut self) {
        self.entered.zeroize();
    }
}

/// Whole seconds, rounded up so a running cooldown never reads as zero
fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
