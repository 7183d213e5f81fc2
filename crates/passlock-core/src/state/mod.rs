//! Passcode lock states
//!
//! A state decides what a completed entry means right now. The lock owns
//! exactly one state and replaces it wholesale on every transition; the only
//! data carried across is the candidate passcode handed from Set to Confirm.

mod change;
mod confirm;
mod enter;
mod set;

pub use change::ChangePasscodeState;
pub use confirm::ConfirmPasscodeState;
pub use enter::EnterPasscodeState;
pub use set::SetPasscodeState;

use crate::config::PasscodeLockConfiguration;
use crate::error::Result;
use crate::repository::PasscodeRepository;
use crate::sign::Passcode;
use crate::strings::DisplayStrings;

/// What the lock should do with a completed entry
#[derive(Debug, Clone)]
pub enum Decision {
    /// The flow is complete
    Succeeded,
    /// Wrong entry; stay in the current state
    Failed,
    /// Continue the flow in another state without a verdict
    Transition(PasscodeLockState),
    /// Wrong entry; restart the flow in another state
    FailedWithTransition(PasscodeLockState),
}

/// The current meaning of a completed entry
#[derive(Debug, Clone)]
pub enum PasscodeLockState {
    Enter(EnterPasscodeState),
    Set(SetPasscodeState),
    Confirm(ConfirmPasscodeState),
    Change(ChangePasscodeState),
}

/// Variant tag of a [`PasscodeLockState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Enter,
    Set,
    Confirm,
    Change,
}

impl PasscodeLockState {
    pub fn kind(&self) -> StateKind {
        match self {
            PasscodeLockState::Enter(_) => StateKind::Enter,
            PasscodeLockState::Set(_) => StateKind::Set,
            PasscodeLockState::Confirm(_) => StateKind::Confirm,
            PasscodeLockState::Change(_) => StateKind::Change,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PasscodeLockState::Enter(s) => s.title(),
            PasscodeLockState::Set(s) => s.title(),
            PasscodeLockState::Confirm(s) => s.title(),
            PasscodeLockState::Change(s) => s.title(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            PasscodeLockState::Enter(s) => s.description(),
            PasscodeLockState::Set(s) => s.description(),
            PasscodeLockState::Confirm(s) => s.description(),
            PasscodeLockState::Change(s) => s.description(),
        }
    }

    /// Whether the screen may be dismissed without completing
    pub fn is_cancellable_action(&self) -> bool {
        match self {
            PasscodeLockState::Enter(s) => s.is_cancellable_action(),
            PasscodeLockState::Set(_)
            | PasscodeLockState::Confirm(_)
            | PasscodeLockState::Change(_) => true,
        }
    }

    /// Biometrics vouch for an existing passcode, so only Enter allows them
    pub fn is_touch_id_allowed(&self) -> bool {
        matches!(self, PasscodeLockState::Enter(_))
    }

    /// States that check an entry against the stored passcode
    pub fn is_verifying(&self) -> bool {
        matches!(
            self,
            PasscodeLockState::Enter(_) | PasscodeLockState::Change(_)
        )
    }

    /// Decide what a completed entry means
    pub fn accept_passcode(
        &self,
        passcode: &Passcode,
        repository: &dyn PasscodeRepository,
        strings: &DisplayStrings,
    ) -> Result<Decision> {
        match self {
            PasscodeLockState::Enter(s) => s.accept_passcode(passcode, repository),
            PasscodeLockState::Set(s) => Ok(s.accept_passcode(passcode, strings)),
            PasscodeLockState::Confirm(s) => s.accept_passcode(passcode, repository, strings),
            PasscodeLockState::Change(s) => s.accept_passcode(passcode, repository, strings),
        }
    }
}

/// Purpose a lock screen is presented for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Verify the stored passcode
    Enter,
    /// Create a passcode
    Set,
    /// Verify the stored passcode, then create a new one
    Change,
    /// Verify the stored passcode, then delete it
    Remove,
}

impl LockMode {
    /// Whether the mode needs a stored passcode to start
    pub fn requires_passcode(self) -> bool {
        !matches!(self, LockMode::Set)
    }

    /// State the lock starts in
    pub fn initial_state(self, configuration: &PasscodeLockConfiguration) -> PasscodeLockState {
        let strings = &configuration.strings;
        match self {
            LockMode::Enter => PasscodeLockState::Enter(EnterPasscodeState::new(
                configuration.allow_cancellation,
                strings,
            )),
            LockMode::Set => PasscodeLockState::Set(SetPasscodeState::new(strings)),
            LockMode::Change => PasscodeLockState::Change(ChangePasscodeState::new(strings)),
            LockMode::Remove => {
                PasscodeLockState::Enter(EnterPasscodeState::for_removal(strings))
            }
        }
    }
}
