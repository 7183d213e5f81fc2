//! Passlock Core - Passcode lock state machine and engine
//!
//! This crate provides the logic behind a numeric passcode lock screen:
//! - Passcode states (enter, set, confirm, change) and lock modes
//! - The lock engine that buffers signs and applies state decisions
//! - Passcode storage contracts with in-memory and file-backed stores
//! - Biometric shortcut plumbing
//! - Optional attempt lockout
//! - Configuration and localizable display strings
//!
//! Rendering is left to the caller: observe a [`PasscodeLock`] through
//! [`PasscodeLockObserver`] and forward key presses to it.

pub mod biometric;
pub mod config;
pub mod error;
pub mod lock;
pub mod lockout;
pub mod repository;
pub mod sign;
pub mod state;
pub mod strings;

pub use biometric::{
    BiometricAuthenticator, BiometricError, BiometricPrompt, UnavailableAuthenticator,
};
pub use config::{ConfigError, PasscodeLockConfiguration};
pub use error::{LockError, RepositoryError, Result, SignError};
pub use lock::{DeleteAction, DeleteKey, DeleteKeyTap, PasscodeLock, PasscodeLockObserver};
pub use lockout::{LockoutGuard, LockoutPolicy};
pub use repository::{FileRepository, MemoryRepository, PasscodeRepository};
pub use sign::{Passcode, PasscodeSign};
pub use state::{
    ChangePasscodeState, ConfirmPasscodeState, Decision, EnterPasscodeState, LockMode,
    PasscodeLockState, SetPasscodeState, StateKind,
};
pub use strings::{DisplayStrings, StringKey};

/// Passcode length used when the configuration does not name one
pub const DEFAULT_PASSCODE_LENGTH: usize = 4;
