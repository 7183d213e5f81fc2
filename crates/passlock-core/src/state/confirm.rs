//! Re-entry of a freshly chosen passcode

use crate::error::Result;
use crate::repository::PasscodeRepository;
use crate::sign::Passcode;
use crate::strings::{DisplayStrings, StringKey};

use super::{Decision, PasscodeLockState, SetPasscodeState};

#[derive(Debug, Clone)]
pub struct ConfirmPasscodeState {
    title: String,
    description: String,
    /// Entry from the Set step; compared against, never modified
    candidate: Passcode,
}

impl ConfirmPasscodeState {
    pub fn new(candidate: Passcode, strings: &DisplayStrings) -> Self {
        Self {
            title: strings.resolve(StringKey::ConfirmTitle),
            description: strings.resolve(StringKey::ConfirmDescription),
            candidate,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether `passcode` is the candidate awaiting confirmation
    pub fn is_candidate(&self, passcode: &Passcode) -> bool {
        self.candidate == *passcode
    }

    pub(crate) fn accept_passcode(
        &self,
        passcode: &Passcode,
        repository: &dyn PasscodeRepository,
        strings: &DisplayStrings,
    ) -> Result<Decision> {
        if self.is_candidate(passcode) {
            repository.save_passcode(passcode)?;
            return Ok(Decision::Succeeded);
        }

        // Mismatch: the candidate is dropped and creation restarts
        let retry = SetPasscodeState::with_text(
            strings.resolve(StringKey::MismatchTitle),
            strings.resolve(StringKey::MismatchDescription),
        );
        Ok(Decision::FailedWithTransition(PasscodeLockState::Set(retry)))
    }
}
