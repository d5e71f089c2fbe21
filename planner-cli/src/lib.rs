//! # Planner CLI
//!
//! Command-line tools for the household planner.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a gesture script against the swipe engine
//! planner replay gestures.json --config swipe.json
//!
//! # Inspect and maintain the hosted store
//! export PLANNER_STORE_URL=https://project.example.co
//! export PLANNER_STORE_KEY=...
//! planner tasks --week-offset -1 --filter ann
//! planner wishes
//! planner delete-wish 2f1c...
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StoreSettings` - Store connection, from flags or environment
//! - [`replay`] - Gesture script runner over `swipe_core::SwipeList`
//! - [`commands`] - Store-backed subcommands over `planner_store::DataStore`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;
pub mod replay;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use planner_store::{RestStore, RetryConfig, StoreConfig, TaskFilter};
use swipe_core::{ItemKind, SwipeConfig};
use uuid::Uuid;

use crate::replay::{replay, signal_name, Script};

/// Command-line arguments for the planner tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "planner")]
#[command(about = "Household planner tools: gesture replay and store maintenance")]
#[command(version)]
pub struct CliArgs {
    /// Store project URL (e.g., <https://project.example.co>)
    #[arg(long, global = true, env = "PLANNER_STORE_URL")]
    pub store_url: Option<String>,

    /// Store API key
    #[arg(long, global = true, env = "PLANNER_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Attempts per store request before giving up
    #[arg(long, global = true, default_value = "3")]
    pub store_attempts: u32,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Planner subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a JSON gesture script and print the emitted signals
    Replay {
        /// Script file
        script: PathBuf,
        /// Swipe configuration file (JSON); defaults apply otherwise
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the tasks of a week
    Tasks {
        /// Weeks relative to the current one
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        week_offset: i32,
        /// Only this weekday, 0 (Monday) to 6 (Sunday)
        #[arg(long)]
        day: Option<u8>,
        /// Member name, or "all"
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// List wishes by category
    Wishes,
    /// Delete a task
    DeleteTask {
        /// Task ID
        id: Uuid,
    },
    /// Delete a wish
    DeleteWish {
        /// Wish ID
        id: Uuid,
    },
}

/// Store connection settings.
#[derive(Debug, Clone, Default)]
pub struct StoreSettings {
    /// Project URL.
    pub url: Option<String>,
    /// API key.
    pub key: Option<String>,
    /// Attempts per request.
    pub attempts: u32,
}

impl From<&CliArgs> for StoreSettings {
    fn from(args: &CliArgs) -> Self {
        Self {
            url: args.store_url.clone(),
            key: args.store_key.clone(),
            attempts: args.store_attempts,
        }
    }
}

impl StoreSettings {
    /// Build the REST client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or key is missing.
    pub fn store_config(&self) -> anyhow::Result<StoreConfig> {
        let url = self
            .url
            .as_deref()
            .context("store URL missing: pass --store-url or set PLANNER_STORE_URL")?;
        let key = self
            .key
            .as_deref()
            .context("store key missing: pass --store-key or set PLANNER_STORE_KEY")?;
        let retry = RetryConfig {
            max_attempts: self.attempts.max(1),
            ..RetryConfig::default()
        };
        Ok(StoreConfig::new(url, key).with_retry(retry))
    }

    /// Connect to the REST store.
    ///
    /// # Errors
    ///
    /// Returns an error if settings are missing or the client cannot be built.
    pub fn connect(&self) -> anyhow::Result<RestStore> {
        Ok(RestStore::new(self.store_config()?)?)
    }
}

/// Run the parsed command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn run<W: Write>(args: CliArgs, out: &mut W) -> anyhow::Result<()> {
    let settings = StoreSettings::from(&args);
    match args.command {
        Command::Replay {
            script,
            config,
            json,
        } => run_replay(&script, config.as_deref(), json, out),
        Command::Tasks {
            week_offset,
            day,
            filter,
        } => {
            let store = settings.connect()?;
            let filter: TaskFilter = filter.parse()?;
            let today = chrono::Local::now().date_naive();
            commands::print_tasks(&store, today, week_offset, day, &filter, out).await
        }
        Command::Wishes => {
            let store = settings.connect()?;
            commands::print_wishes(&store, out).await
        }
        Command::DeleteTask { id } => {
            let store = Arc::new(settings.connect()?);
            commands::delete_item(store, ItemKind::Task, id, out).await?;
            Ok(())
        }
        Command::DeleteWish { id } => {
            let store = Arc::new(settings.connect()?);
            commands::delete_item(store, ItemKind::Wish, id, out).await?;
            Ok(())
        }
    }
}

/// Replay a script file and print its report.
///
/// # Errors
///
/// Returns an error if the files cannot be loaded or the replay fails.
pub fn run_replay<W: Write>(
    script: &std::path::Path,
    config: Option<&std::path::Path>,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let script = Script::load(script)?;
    let config = match config {
        Some(path) => replay::load_config(path)?,
        None => SwipeConfig::default(),
    };
    let report = replay(&script, config)?;
    tracing::info!(
        "Replayed {} steps, {} signals, {} deleted",
        script.steps.len(),
        report.events.len(),
        report.deleted.len()
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for event in &report.events {
        writeln!(
            out,
            "step {:>3}  {:<12} {}",
            event.step,
            event.item,
            signal_name(&event.signal)
        )?;
    }
    for (name, state) in &report.final_states {
        writeln!(
            out,
            "final     {name:<12} offset={:.1} open={} dismissing={}",
            state.offset, state.open, state.dismissing
        )?;
    }
    for name in &report.deleted {
        writeln!(out, "deleted   {name}")?;
    }
    Ok(())
}
