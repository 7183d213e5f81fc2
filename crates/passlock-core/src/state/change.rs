//! Verify the old passcode, then continue into creating a new one

use crate::error::{LockError, Result};
use crate::repository::PasscodeRepository;
use crate::sign::Passcode;
use crate::strings::{DisplayStrings, StringKey};

use super::{Decision, PasscodeLockState, SetPasscodeState};

#[derive(Debug, Clone)]
pub struct ChangePasscodeState {
    title: String,
    description: String,
}

impl ChangePasscodeState {
    pub fn new(strings: &DisplayStrings) -> Self {
        Self {
            title: strings.resolve(StringKey::ChangeTitle),
            description: strings.resolve(StringKey::ChangeDescription),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn accept_passcode(
        &self,
        passcode: &Passcode,
        repository: &dyn PasscodeRepository,
        strings: &DisplayStrings,
    ) -> Result<Decision> {
        let stored = repository.passcode().ok_or(LockError::PasscodeNotSet)?;

        if *passcode == stored {
            Ok(Decision::Transition(PasscodeLockState::Set(
                SetPasscodeState::new(strings),
            )))
        } else {
            Ok(Decision::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn passcode(s: &str) -> Passcode {
        s.parse().unwrap()
    }

    #[test]
    fn test_old_passcode_leads_to_set() {
        let repository = MemoryRepository::with_passcode(passcode("1357"));
        let strings = DisplayStrings::default();
        let state = ChangePasscodeState::new(&strings);

        let decision = state
            .accept_passcode(&passcode("1357"), &repository, &strings)
            .unwrap();
        assert!(matches!(
            decision,
            Decision::Transition(PasscodeLockState::Set(_))
        ));
        // Nothing is written until the new passcode is confirmed
        assert_eq!(repository.passcode(), Some(passcode("1357")));
    }

    #[test]
    fn test_wrong_old_passcode_fails() {
        let repository = MemoryRepository::with_passcode(passcode("1357"));
        let strings = DisplayStrings::default();
        let state = ChangePasscodeState::new(&strings);

        let decision = state
            .accept_passcode(&passcode("0000"), &repository, &strings)
            .unwrap();
        assert!(matches!(decision, Decision::Failed));
    }

    #[test]
    fn test_missing_passcode_is_an_error() {
        let repository = MemoryRepository::new();
        let strings = DisplayStrings::default();
        let state = ChangePasscodeState::new(&strings);

        assert!(matches!(
            state.accept_passcode(&passcode("0000"), &repository, &strings),
            Err(LockError::PasscodeNotSet)
        ));
    }
}
