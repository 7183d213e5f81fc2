//! End-to-end lock flow tests
//!
//! These tests drive complete lock flows through the public API, from key
//! presses to the stored passcode, against both repository implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use passlock_core::{
    BiometricAuthenticator, BiometricError, FileRepository, LockError, LockMode, LockoutPolicy,
    MemoryRepository, Passcode, PasscodeLock, PasscodeLockConfiguration, PasscodeLockObserver,
    PasscodeRepository, PasscodeSign, StateKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Success,
    Failure,
    StateChanged(StateKind),
    LockedOut,
}

/// Records verdicts and state changes; sign events are left out
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl PasscodeLockObserver for Recorder {
    fn on_success(&self, _lock: &PasscodeLock) {
        self.push(Event::Success);
    }

    fn on_failure(&self, _lock: &PasscodeLock) {
        self.push(Event::Failure);
    }

    fn on_state_changed(&self, lock: &PasscodeLock) {
        self.push(Event::StateChanged(lock.state().kind()));
    }

    fn on_sign_added(&self, _lock: &PasscodeLock, _index: usize) {}

    fn on_sign_removed(&self, _lock: &PasscodeLock, _index: usize) {}

    fn on_locked_out(&self, _lock: &PasscodeLock, _remaining: std::time::Duration) {
        self.push(Event::LockedOut);
    }
}

struct ApprovingSensor;

#[async_trait]
impl BiometricAuthenticator for ApprovingSensor {
    fn is_available(&self) -> bool {
        true
    }

    async fn authenticate(&self, _reason: &str) -> Result<(), BiometricError> {
        Ok(())
    }
}

fn passcode(digits: &str) -> Passcode {
    digits.parse().unwrap()
}

fn type_digits(lock: &mut PasscodeLock, digits: &str) -> Result<(), LockError> {
    for c in digits.chars() {
        lock.add_sign(PasscodeSign::try_from(c).unwrap())?;
    }
    Ok(())
}

fn open_lock(
    mode: LockMode,
    configuration: PasscodeLockConfiguration,
    repository: Arc<dyn PasscodeRepository>,
) -> (PasscodeLock, Arc<Recorder>) {
    let mut lock = PasscodeLock::for_mode(mode, configuration, repository).unwrap();
    let recorder = Arc::new(Recorder::default());
    lock.set_observer(&recorder);
    (lock, recorder)
}

#[test]
fn test_enter_scenario() {
    let repository = Arc::new(MemoryRepository::with_passcode(passcode("1357")));
    let (mut lock, recorder) = open_lock(
        LockMode::Enter,
        PasscodeLockConfiguration::with_length(4),
        repository,
    );

    type_digits(&mut lock, "1357").unwrap();
    assert_eq!(recorder.take(), vec![Event::Success]);

    type_digits(&mut lock, "1111").unwrap();
    assert_eq!(recorder.take(), vec![Event::Failure]);
    assert!(lock.is_pincode_empty());
    assert_eq!(lock.state().kind(), StateKind::Enter);
}

#[test]
fn test_set_scenario() {
    let repository = Arc::new(MemoryRepository::new());
    let (mut lock, recorder) = open_lock(
        LockMode::Set,
        PasscodeLockConfiguration::with_length(4),
        repository.clone(),
    );

    // ==========================================
    // Choose and confirm "2468"
    // ==========================================
    type_digits(&mut lock, "2468").unwrap();
    assert_eq!(lock.state().kind(), StateKind::Confirm);
    assert!(lock.is_pincode_empty());

    type_digits(&mut lock, "2468").unwrap();
    assert_eq!(
        recorder.take(),
        vec![Event::StateChanged(StateKind::Confirm), Event::Success]
    );
    assert_eq!(repository.passcode(), Some(passcode("2468")));

    // ==========================================
    // A second flow that fails confirmation
    // ==========================================
    let (mut lock, recorder) = open_lock(
        LockMode::Set,
        PasscodeLockConfiguration::with_length(4),
        repository.clone(),
    );

    type_digits(&mut lock, "2468").unwrap();
    type_digits(&mut lock, "1111").unwrap();

    assert_eq!(
        recorder.take(),
        vec![
            Event::StateChanged(StateKind::Confirm),
            Event::StateChanged(StateKind::Set),
            Event::Failure,
        ]
    );
    assert_eq!(lock.state().kind(), StateKind::Set);
    assert_eq!(repository.passcode(), Some(passcode("2468")));
}

#[test]
fn test_file_repository_lifecycle() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = temp_dir.path().join("passlock").join("passcode.json");

    // Set
    {
        let repository = Arc::new(FileRepository::open(store.clone()).unwrap());
        let (mut lock, recorder) = open_lock(
            LockMode::Set,
            PasscodeLockConfiguration::default(),
            repository,
        );
        type_digits(&mut lock, "0427").unwrap();
        type_digits(&mut lock, "0427").unwrap();
        assert!(recorder.take().contains(&Event::Success));
    }
    assert!(store.exists());

    // Change, from a freshly opened store
    {
        let repository = Arc::new(FileRepository::open(store.clone()).unwrap());
        let (mut lock, recorder) = open_lock(
            LockMode::Change,
            PasscodeLockConfiguration::default(),
            repository,
        );
        type_digits(&mut lock, "0427").unwrap();
        type_digits(&mut lock, "9051").unwrap();
        type_digits(&mut lock, "9051").unwrap();
        assert_eq!(
            recorder.take(),
            vec![
                Event::StateChanged(StateKind::Set),
                Event::StateChanged(StateKind::Confirm),
                Event::Success,
            ]
        );
    }

    // Enter with the new passcode
    {
        let repository = Arc::new(FileRepository::open(store.clone()).unwrap());
        assert_eq!(repository.passcode(), Some(passcode("9051")));
        let (mut lock, recorder) = open_lock(
            LockMode::Enter,
            PasscodeLockConfiguration::default(),
            repository,
        );
        type_digits(&mut lock, "0427").unwrap();
        type_digits(&mut lock, "9051").unwrap();
        assert_eq!(recorder.take(), vec![Event::Failure, Event::Success]);
    }

    // Remove
    {
        let repository = Arc::new(FileRepository::open(store.clone()).unwrap());
        let (mut lock, recorder) = open_lock(
            LockMode::Remove,
            PasscodeLockConfiguration::default(),
            repository.clone(),
        );
        type_digits(&mut lock, "9051").unwrap();
        assert_eq!(recorder.take(), vec![Event::Success]);
        assert!(!repository.has_passcode());
    }
    assert!(!store.exists());

    let repository: Arc<dyn PasscodeRepository> =
        Arc::new(FileRepository::open(store.clone()).unwrap());
    assert!(matches!(
        PasscodeLock::for_mode(LockMode::Enter, PasscodeLockConfiguration::default(), repository),
        Err(LockError::PasscodeNotSet)
    ));
}

#[test]
fn test_configuration_file_drives_lock() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");

    let document = serde_json::json!({
        "passcode_length": 6,
        "lockout": { "threshold": 2, "lockout_durations": [600] }
    });
    std::fs::write(&config_path, document.to_string()).unwrap();

    let configuration = PasscodeLockConfiguration::load(&config_path).unwrap();
    assert_eq!(configuration.passcode_length, 6);
    assert!(configuration.allow_cancellation);

    let repository = Arc::new(MemoryRepository::with_passcode(passcode("135790")));
    let (mut lock, recorder) = open_lock(LockMode::Enter, configuration, repository);

    type_digits(&mut lock, "000000").unwrap();
    type_digits(&mut lock, "000000").unwrap();
    assert_eq!(
        recorder.take(),
        vec![Event::Failure, Event::Failure, Event::LockedOut]
    );

    // Even the right passcode is refused during the cooldown
    let err = type_digits(&mut lock, "135790").unwrap_err();
    assert!(matches!(err, LockError::LockedOut { .. }));
    assert!(recorder.take().is_empty());
}

#[test]
fn test_lockout_presets_escalate() {
    let policy = LockoutPolicy::default();
    let below = policy.lockout_duration(policy.threshold - 1);
    let first = policy.lockout_duration(policy.threshold).unwrap();
    let second = policy.lockout_duration(policy.threshold + 1).unwrap();

    assert!(below.is_none());
    assert!(second > first);
}

#[tokio::test]
async fn test_biometric_unlock_then_teardown() {
    let repository = Arc::new(MemoryRepository::with_passcode(passcode("1357")));
    let (lock, recorder) = open_lock(
        LockMode::Enter,
        PasscodeLockConfiguration::default(),
        repository,
    );
    let mut lock = lock.with_authenticator(Arc::new(ApprovingSensor));

    let prompt = lock.authenticate_with_biometrics(None).unwrap();
    tokio::spawn(prompt.run());
    lock.next_biometric_outcome().await.unwrap();
    assert_eq!(recorder.take(), vec![Event::Success]);

    // A request that is still in flight when the screen goes away is dropped
    let prompt = lock.authenticate_with_biometrics(None).unwrap();
    lock.tear_down();
    prompt.run().await;
    lock.process_biometric_outcomes().unwrap();
    assert!(recorder.take().is_empty());
}
