//! Command-line transport for the coil store.
//!
//! # Responsibility
//! - Map subcommands to `coilstock_core` operations.
//! - Print results as JSON and map typed errors to exit codes.
//!
//! # Exit codes
//! - `0` success, `1` storage/config failure, `2` invalid input,
//!   `3` coil not found, `4` coil already removed.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use coilstock_core::db::DbError;
use coilstock_core::{
    init_logging_from_config, CoilFilter, CoilPatch, CoilServiceError, CoilStore, ConfigError,
    CoreConfig, NewCoil, RangeFilter, RepoError, StatisticsError,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "coilstock", about = "Warehouse inventory tracker for metal coils", version)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and environment).
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a coil arriving now.
    Create {
        #[arg(long)]
        length: f64,
        #[arg(long)]
        weight: f64,
    },
    /// Show one coil.
    Get { id: i64 },
    /// Change length and/or weight of a coil.
    Update {
        id: i64,
        #[arg(long)]
        length: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Mark a coil as removed from the warehouse.
    Remove { id: i64 },
    /// List coils matching all given ranges.
    List(ListArgs),
    /// Aggregate statistics for a time window.
    Stats {
        /// Window start, RFC 3339.
        #[arg(long)]
        start: DateTime<Utc>,
        /// Window end, RFC 3339.
        #[arg(long)]
        end: DateTime<Utc>,
    },
    /// Check that the database opens and report the version.
    Health,
}

/// A range applies only when both its min and max are given.
#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    id_min: Option<i64>,
    #[arg(long)]
    id_max: Option<i64>,
    #[arg(long)]
    weight_min: Option<f64>,
    #[arg(long)]
    weight_max: Option<f64>,
    #[arg(long)]
    length_min: Option<f64>,
    #[arg(long)]
    length_max: Option<f64>,
    #[arg(long)]
    added_after: Option<DateTime<Utc>>,
    #[arg(long)]
    added_before: Option<DateTime<Utc>>,
    #[arg(long)]
    removed_after: Option<DateTime<Utc>>,
    #[arg(long)]
    removed_before: Option<DateTime<Utc>>,
}

impl ListArgs {
    fn into_filter(self) -> CoilFilter {
        CoilFilter {
            id: RangeFilter::from_bounds(self.id_min, self.id_max),
            weight: RangeFilter::from_bounds(self.weight_min, self.weight_max),
            length: RangeFilter::from_bounds(self.length_min, self.length_max),
            added_at: RangeFilter::from_bounds(self.added_after, self.added_before),
            removed_at: RangeFilter::from_bounds(self.removed_after, self.removed_before),
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Coil(CoilServiceError),
    Stats(StatisticsError),
    Output(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Coil(CoilServiceError::Validation(_)) => 2,
            Self::Coil(CoilServiceError::NotFound(_)) => 3,
            Self::Coil(CoilServiceError::AlreadyRemoved { .. }) => 4,
            Self::Stats(StatisticsError::InvalidRange(_)) => 2,
            _ => 1,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Db(err) => format!("database error: {err}"),
            Self::Repo(err) => format!("storage error: {err}"),
            Self::Coil(err) => err.to_string(),
            Self::Stats(err) => err.to_string(),
            Self::Output(err) => format!("failed to encode output: {err}"),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for CliError {
            fn from(value: $source) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_from! {
    ConfigError => Config,
    DbError => Db,
    RepoError => Repo,
    CoilServiceError => Coil,
    StatisticsError => Stats,
    serde_json::Error => Output,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::warn!(
                "event=cli_command module=cli status=error exit_code={}",
                err.exit_code()
            );
            eprintln!("error: {}", err.message());
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }

    if let Err(err) = init_logging_from_config(&config.logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let store = CoilStore::open(&config.database)?;

    match cli.command {
        Command::Create { length, weight } => {
            print_json(&store.coils()?.create(&NewCoil::new(length, weight))?)
        }
        Command::Get { id } => print_json(&store.coils()?.get_by_id(id)?),
        Command::Update { id, length, weight } => {
            let patch = CoilPatch { length, weight };
            print_json(&store.coils()?.update(id, &patch)?)
        }
        Command::Remove { id } => print_json(&store.coils()?.remove(id)?),
        Command::List(args) => print_json(&store.coils()?.list(&args.into_filter())?),
        Command::Stats { start, end } => {
            print_json(&store.statistics()?.statistics_between(start, end)?)
        }
        Command::Health => print_json(&Health {
            status: "ok",
            version: coilstock_core::core_version(),
        }),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
