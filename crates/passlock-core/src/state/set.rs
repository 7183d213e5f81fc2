//! First entry of a new passcode

use crate::sign::Passcode;
use crate::strings::{DisplayStrings, StringKey};

use super::{ConfirmPasscodeState, Decision, PasscodeLockState};

#[derive(Debug, Clone)]
pub struct SetPasscodeState {
    title: String,
    description: String,
}

impl SetPasscodeState {
    pub fn new(strings: &DisplayStrings) -> Self {
        Self::with_text(
            strings.resolve(StringKey::SetTitle),
            strings.resolve(StringKey::SetDescription),
        )
    }

    /// Set state with explicit text, e.g. after a confirmation mismatch
    pub fn with_text(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Nothing to compare against yet: hand the entry to Confirm
    pub(crate) fn accept_passcode(&self, passcode: &Passcode, strings: &DisplayStrings) -> Decision {
        Decision::Transition(PasscodeLockState::Confirm(ConfirmPasscodeState::new(
            passcode.clone(),
            strings,
        )))
    }
}
