//! Verify an entry against the stored passcode

use crate::error::{LockError, Result};
use crate::repository::PasscodeRepository;
use crate::sign::Passcode;
use crate::strings::{DisplayStrings, StringKey};

use super::Decision;

#[derive(Debug, Clone)]
pub struct EnterPasscodeState {
    title: String,
    description: String,
    is_cancellable_action: bool,
    /// Delete the stored passcode once verified (remove flow)
    removes_passcode: bool,
}

impl EnterPasscodeState {
    pub fn new(allow_cancellation: bool, strings: &DisplayStrings) -> Self {
        Self {
            title: strings.resolve(StringKey::EnterTitle),
            description: strings.resolve(StringKey::EnterDescription),
            is_cancellable_action: allow_cancellation,
            removes_passcode: false,
        }
    }

    /// Verification that deletes the passcode on success
    pub fn for_removal(strings: &DisplayStrings) -> Self {
        Self {
            removes_passcode: true,
            ..Self::new(true, strings)
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_cancellable_action(&self) -> bool {
        self.is_cancellable_action
    }

    pub fn removes_passcode(&self) -> bool {
        self.removes_passcode
    }

    pub(crate) fn accept_passcode(
        &self,
        passcode: &Passcode,
        repository: &dyn PasscodeRepository,
    ) -> Result<Decision> {
        let stored = repository.passcode().ok_or(LockError::PasscodeNotSet)?;

        if *passcode == stored {
            self.complete(repository)?;
            Ok(Decision::Succeeded)
        } else {
            Ok(Decision::Failed)
        }
    }

    /// Finish a successful verification (manual or biometric)
    pub(crate) fn complete(&self, repository: &dyn PasscodeRepository) -> Result<()> {
        if self.removes_passcode {
            repository.delete_passcode()?;
        }
        Ok(())
    }
}
