//! Display strings shown by the lock screen
//!
//! Every string the lock shows has a stable [`StringKey`]. Callers may supply
//! a [`DisplayStrings`] bundle; any key it leaves empty falls back to the
//! built-in English table.

use serde::{Deserialize, Serialize};

/// Identifies one displayed string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKey {
    EnterTitle,
    EnterDescription,
    SetTitle,
    SetDescription,
    ConfirmTitle,
    ConfirmDescription,
    ChangeTitle,
    ChangeDescription,
    MismatchTitle,
    MismatchDescription,
    Cancel,
    Delete,
    UseBiometrics,
    BiometricReason,
}

impl StringKey {
    /// Every key, in table order
    pub const ALL: [StringKey; 14] = [
        StringKey::EnterTitle,
        StringKey::EnterDescription,
        StringKey::SetTitle,
        StringKey::SetDescription,
        StringKey::ConfirmTitle,
        StringKey::ConfirmDescription,
        StringKey::ChangeTitle,
        StringKey::ChangeDescription,
        StringKey::MismatchTitle,
        StringKey::MismatchDescription,
        StringKey::Cancel,
        StringKey::Delete,
        StringKey::UseBiometrics,
        StringKey::BiometricReason,
    ];

    /// Lookup key in localization tables
    pub fn key(self) -> &'static str {
        match self {
            StringKey::EnterTitle => "PasscodeLockEnterTitle",
            StringKey::EnterDescription => "PasscodeLockEnterDescription",
            StringKey::SetTitle => "PasscodeLockSetTitle",
            StringKey::SetDescription => "PasscodeLockSetDescription",
            StringKey::ConfirmTitle => "PasscodeLockConfirmTitle",
            StringKey::ConfirmDescription => "PasscodeLockConfirmDescription",
            StringKey::ChangeTitle => "PasscodeLockChangeTitle",
            StringKey::ChangeDescription => "PasscodeLockChangeDescription",
            StringKey::MismatchTitle => "PasscodeLockMismatchTitle",
            StringKey::MismatchDescription => "PasscodeLockMismatchDescription",
            StringKey::Cancel => "Cancel",
            StringKey::Delete => "Delete",
            StringKey::UseBiometrics => "UseTouchId",
            StringKey::BiometricReason => "PasscodeLockTouchIDReason",
        }
    }

    /// Built-in English text
    pub fn default_text(self) -> &'static str {
        match self {
            StringKey::EnterTitle => "Enter Passcode",
            StringKey::EnterDescription => "Enter your passcode to proceed.",
            StringKey::SetTitle => "Enter Passcode",
            StringKey::SetDescription => "Set your new passcode.",
            StringKey::ConfirmTitle => "Confirm Passcode",
            StringKey::ConfirmDescription => "Enter the passcode again.",
            StringKey::ChangeTitle => "Enter Passcode",
            StringKey::ChangeDescription => "Enter your old passcode.",
            StringKey::MismatchTitle => "Try again",
            StringKey::MismatchDescription => "Passcodes didn't match.",
            StringKey::Cancel => "Cancel",
            StringKey::Delete => "Delete",
            StringKey::UseBiometrics => "Use Biometrics",
            StringKey::BiometricReason => "Authentication required to proceed",
        }
    }
}

/// Caller-supplied overrides for displayed strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DisplayStrings {
    pub enter_title: Option<String>,
    pub enter_description: Option<String>,
    pub set_title: Option<String>,
    pub set_description: Option<String>,
    pub confirm_title: Option<String>,
    pub confirm_description: Option<String>,
    pub change_title: Option<String>,
    pub change_description: Option<String>,
    pub mismatch_title: Option<String>,
    pub mismatch_description: Option<String>,
    pub cancel_label: Option<String>,
    pub delete_label: Option<String>,
    pub use_biometrics_label: Option<String>,
    pub biometric_reason: Option<String>,
}

impl DisplayStrings {
    /// Override for a key, if one was supplied
    pub fn get(&self, key: StringKey) -> Option<&str> {
        let value = match key {
            StringKey::EnterTitle => &self.enter_title,
            StringKey::EnterDescription => &self.enter_description,
            StringKey::SetTitle => &self.set_title,
            StringKey::SetDescription => &self.set_description,
            StringKey::ConfirmTitle => &self.confirm_title,
            StringKey::ConfirmDescription => &self.confirm_description,
            StringKey::ChangeTitle => &self.change_title,
            StringKey::ChangeDescription => &self.change_description,
            StringKey::MismatchTitle => &self.mismatch_title,
            StringKey::MismatchDescription => &self.mismatch_description,
            StringKey::Cancel => &self.cancel_label,
            StringKey::Delete => &self.delete_label,
            StringKey::UseBiometrics => &self.use_biometrics_label,
            StringKey::BiometricReason => &self.biometric_reason,
        };
        value.as_deref()
    }

    /// Resolve a key: the override wins, otherwise the default table
    pub fn resolve(&self, key: StringKey) -> String {
        self.get(key).unwrap_or_else(|| key.default_text()).to_string()
    }
}
