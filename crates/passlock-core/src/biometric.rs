//! Biometric shortcut for passcode entry
//!
//! The lock never talks to a platform prompt directly. It hands out a
//! [`BiometricPrompt`] which the caller drives on its own executor; the
//! outcome comes back through the lock's inbox tagged with the generation it
//! was issued in, so answers that arrive after the lock moved on are dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Device-level biometric approval (fingerprint, face)
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    /// Whether biometric hardware is present and enrolled
    fn is_available(&self) -> bool;

    /// Ask the user to approve with biometrics
    ///
    /// One request per call; callers must not overlap requests.
    async fn authenticate(&self, reason: &str) -> Result<(), BiometricError>;
}

/// Reasons a biometric request did not approve
///
/// None of these count as a wrong passcode; the user falls back to manual entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BiometricError {
    #[error("Biometric authentication not available on this device")]
    NotAvailable,

    #[error("No biometrics enrolled")]
    NotEnrolled,

    #[error("Biometric prompt cancelled")]
    Cancelled,

    #[error("Biometric match failed")]
    Denied,

    #[error("Biometric authentication failed: {0}")]
    Failed(String),
}

/// Authenticator for platforms without biometrics
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAuthenticator;

#[async_trait]
impl BiometricAuthenticator for UnavailableAuthenticator {
    fn is_available(&self) -> bool {
        false
    }

    async fn authenticate(&self, _reason: &str) -> Result<(), BiometricError> {
        Err(BiometricError::NotAvailable)
    }
}

/// Result of a prompt, posted back to the lock
#[derive(Debug)]
pub(crate) struct BiometricOutcome {
    pub generation: u64,
    pub result: Result<(), BiometricError>,
}

/// A biometric request issued by a lock
#[must_use = "a prompt does nothing until it is run"]
pub struct BiometricPrompt {
    authenticator: Arc<dyn BiometricAuthenticator>,
    reason: String,
    generation: u64,
    /// Taken once the outcome is posted
    sender: Option<mpsc::UnboundedSender<BiometricOutcome>>,
}

impl BiometricPrompt {
    pub(crate) fn new(
        authenticator: Arc<dyn BiometricAuthenticator>,
        reason: String,
        generation: u64,
        sender: mpsc::UnboundedSender<BiometricOutcome>,
    ) -> Self {
        Self {
            authenticator,
            reason,
            generation,
            sender: Some(sender),
        }
    }

    /// Text shown in the system prompt
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Run the request and post the outcome to the lock
    ///
    /// If the lock has been dropped in the meantime the outcome is discarded.
    /// Dropping the prompt unrun, or cancelling this future, posts
    /// [`BiometricError::Cancelled`] instead so the lock can issue a new request.
    pub async fn run(mut self) {
        let result = self.authenticator.authenticate(&self.reason).await;
        self.post(result);
    }

    fn post(&mut self, result: Result<(), BiometricError>) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        let outcome = BiometricOutcome {
            generation: self.generation,
            result,
        };
        if sender.send(outcome).is_err() {
            tracing::debug!("Lock dropped before biometric outcome arrived");
        }
    }
}

impl Drop for BiometricPrompt {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::debug!(generation = self.generation, "Biometric prompt abandoned");
            self.post(Err(BiometricError::Cancelled));
        }
    }
}
