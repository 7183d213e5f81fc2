//! Passlock - Terminal driver for the passcode lock
//!
//! Runs one lock flow against a file-backed passcode store. Input is read
//! line by line from stdin: digits are signs, `-` presses the cancel/delete
//! key, `b` asks for biometrics and `q` quits.

mod console;
mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passlock_core::{
    FileRepository, LockError, LockMode, PasscodeLock, PasscodeLockConfiguration,
    PasscodeRepository,
};

use console::{print_progress, print_screen, BiometricsMode, ConsoleObserver, SimulatedAuthenticator};
use input::{feed_line, request_biometrics, KeyOutcome};

/// Passlock - numeric passcode lock
#[derive(Parser)]
#[command(name = "passlock")]
#[command(about = "Set, change, verify or remove a numeric passcode")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the passcode store
    #[arg(long)]
    store: Option<PathBuf>,

    /// Override the configured passcode length
    #[arg(long)]
    length: Option<usize>,

    /// Simulated biometric sensor
    #[arg(long, value_enum, default_value = "none")]
    biometrics: BiometricsMode,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the stored passcode
    Enter,

    /// Choose a new passcode
    Set,

    /// Replace the stored passcode
    Change,

    /// Verify and delete the stored passcode
    Remove,

    /// Show store and configuration status
    Status,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passlock=info,passlock_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(PasscodeLockConfiguration::default_path);

    let mut configuration = match &config_path {
        Some(path) => PasscodeLockConfiguration::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PasscodeLockConfiguration::default(),
    };
    if let Some(length) = cli.length {
        configuration.passcode_length = length;
    }

    let store_path = cli.store.clone().unwrap_or_else(FileRepository::default_path);

    let mode = match cli.command {
        Commands::Enter => LockMode::Enter,
        Commands::Set => LockMode::Set,
        Commands::Change => LockMode::Change,
        Commands::Remove => LockMode::Remove,
        Commands::Status => {
            let repository = FileRepository::open(store_path.clone())?;
            let status = serde_json::json!({
                "passcode_set": repository.has_passcode(),
                "store": repository.path(),
                "config": config_path,
                "passcode_length": configuration.passcode_length,
                "biometrics_allowed": configuration.biometrics_allowed,
                "lockout": configuration.lockout,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }
        Commands::InitConfig { force } => {
            let Some(path) = config_path else {
                bail!("No configuration directory; pass --config");
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            configuration.save(&path)?;
            info!("Wrote configuration to {}", path.display());
            return Ok(());
        }
    };

    let repository = Arc::new(FileRepository::open(store_path.clone())?);
    if mode == LockMode::Set && repository.has_passcode() {
        bail!("A passcode is already set. Use `passlock change` to replace it.");
    }

    let lock = match PasscodeLock::for_mode(mode, configuration, repository.clone()) {
        Err(LockError::PasscodeNotSet) => {
            bail!("No passcode is set. Use `passlock set` first.")
        }
        other => other?,
    };
    let mut lock = lock.with_authenticator(Arc::new(SimulatedAuthenticator::new(cli.biometrics)));
    let observer = Arc::new(ConsoleObserver::default());
    lock.set_observer(&observer);

    if !run(&mut lock, &observer).await? {
        bail!("Passcode lock was not completed");
    }

    match mode {
        LockMode::Set | LockMode::Change => {
            info!("Passcode saved to {}", repository.path().display())
        }
        LockMode::Remove => info!("Passcode removed"),
        LockMode::Enter => {}
    }

    Ok(())
}

/// Drive the lock from stdin; returns whether the flow completed
async fn run(lock: &mut PasscodeLock, observer: &ConsoleObserver) -> anyhow::Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_screen(lock);
    if lock.should_request_biometrics_immediately() {
        request_biometrics(lock, observer).await?;
    }

    while !observer.is_completed() {
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match feed_line(lock, observer, &line).await? {
            KeyOutcome::Continue => {}
            KeyOutcome::LockedOut { remaining_secs } => {
                println!("Locked, try again in {}s", remaining_secs);
            }
            KeyOutcome::Dismissed => {
                println!("Cancelled");
                break;
            }
            KeyOutcome::Completed | KeyOutcome::Quit => break,
        }

        print_progress(lock);
    }

    lock.tear_down();
    Ok(observer.is_completed())
}
