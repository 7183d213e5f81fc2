//! Key handling for the stdin driver

use passlock_core::{DeleteKeyTap, LockError, PasscodeLock, PasscodeSign, SignError};

use crate::console::{print_progress, ConsoleObserver};

/// One key of the terminal keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Sign(PasscodeSign),
    /// `-`: the cancel/delete key
    Delete,
    /// `b`: ask for biometrics
    Biometrics,
    /// `q`: leave without completing
    Quit,
}

/// Where the flow stands after a key or a line of keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Completed,
    /// The cancel key dismissed the lock
    Dismissed,
    Quit,
    /// Entry is paused; the rest of the line was dropped
    LockedOut { remaining_secs: u64 },
}

/// Map an input character to a key; whitespace is skipped
pub fn parse_key(c: char) -> Result<Option<Key>, SignError> {
    let key = match c {
        '-' => Key::Delete,
        'b' => Key::Biometrics,
        'q' => Key::Quit,
        c if c.is_whitespace() => return Ok(None),
        c => Key::Sign(PasscodeSign::try_from(c)?),
    };
    Ok(Some(key))
}

/// Apply one key to the lock
pub async fn press(
    lock: &mut PasscodeLock,
    observer: &ConsoleObserver,
    key: Key,
) -> anyhow::Result<KeyOutcome> {
    match key {
        Key::Sign(sign) => match lock.add_sign(sign) {
            Ok(()) => {}
            Err(LockError::LockedOut { remaining_secs }) => {
                return Ok(KeyOutcome::LockedOut { remaining_secs })
            }
            Err(e) => return Err(e.into()),
        },
        Key::Delete => {
            if lock.tap_delete() == DeleteKeyTap::Dismiss {
                return Ok(KeyOutcome::Dismissed);
            }
        }
        Key::Biometrics => request_biometrics(lock, observer).await?,
        Key::Quit => return Ok(KeyOutcome::Quit),
    }

    if observer.is_completed() {
        Ok(KeyOutcome::Completed)
    } else {
        Ok(KeyOutcome::Continue)
    }
}

/// Apply every key of an input line, stopping at the first that ends it
pub async fn feed_line(
    lock: &mut PasscodeLock,
    observer: &ConsoleObserver,
    line: &str,
) -> anyhow::Result<KeyOutcome> {
    for c in line.trim().chars() {
        let key = match parse_key(c) {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        let outcome = press(lock, observer, key).await?;
        if outcome != KeyOutcome::Continue {
            return Ok(outcome);
        }
    }
    Ok(KeyOutcome::Continue)
}

/// Run a biometric prompt to completion
pub async fn request_biometrics(
    lock: &mut PasscodeLock,
    observer: &ConsoleObserver,
) -> anyhow::Result<()> {
    match lock.authenticate_with_biometrics(None) {
        Some(prompt) => {
            println!("{}", prompt.reason());
            tokio::spawn(prompt.run());
            lock.next_biometric_outcome().await?;
            if !observer.is_completed() {
                println!("Biometrics not accepted");
                print_progress(lock);
            }
        }
        None => println!("Biometrics unavailable"),
    }
    Ok(())
}
