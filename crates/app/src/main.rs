use std::fmt;
use std::path::{Path, PathBuf};

use services::{AppServices, ProgressConfig, ProgressStore};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tutorial_core::model::LayerId;

mod render;

const DEFAULT_DB: &str = "tutorial.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLayerId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLayerId { raw } => write!(f, "invalid layer id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [status]     [--db <sqlite_url>] [--gated]");
    eprintln!("  cargo run -p app -- unlock <id>  [--db <sqlite_url>] [--gated]");
    eprintln!("  cargo run -p app -- focus <id>   [--db <sqlite_url>] [--gated]");
    eprintln!("  cargo run -p app -- reset        [--db <sqlite_url>] [--gated]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB} (in the working directory)");
    eprintln!("  all sections unlocked on first run (--gated starts on section 0 only)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTORIAL_DB_URL, TUTORIAL_GATED, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Unlock(LayerId),
    Focus(LayerId),
    Reset,
}

impl Command {
    fn parse(args: &mut impl Iterator<Item = String>, first: &str) -> Result<Self, ArgsError> {
        match first {
            "status" => Ok(Self::Status),
            "reset" => Ok(Self::Reset),
            "unlock" => parse_layer(require_value(args, "unlock")?).map(Self::Unlock),
            "focus" => parse_layer(require_value(args, "focus")?).map(Self::Focus),
            other => Err(ArgsError::UnknownArg(other.to_string())),
        }
    }

    fn apply(self, store: &ProgressStore) {
        match self {
            Self::Status => {}
            Self::Unlock(id) => store.unlock_layer(id),
            Self::Focus(id) => store.set_current_layer(id),
            Self::Reset => store.reset_progress(),
        }
    }
}

fn parse_layer(raw: String) -> Result<LayerId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidLayerId { raw })
}

struct Args {
    command: Command,
    db: DbTarget,
    gated: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db = match std::env::var("TUTORIAL_DB_URL") {
            Ok(raw) => DbTarget::parse(&raw)?,
            Err(_) => DbTarget::parse(DEFAULT_DB)?,
        };
        let mut gated = std::env::var("TUTORIAL_GATED")
            .ok()
            .is_some_and(|value| matches!(value.trim(), "1" | "true" | "yes"));
        let mut command = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    db = DbTarget::parse(&require_value(&mut args, "--db")?)?;
                }
                "--gated" => gated = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if command.is_none() && !other.starts_with("--") => {
                    command = Some(Command::parse(&mut args, other)?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command: command.unwrap_or(Command::Status),
            db,
            gated,
        })
    }

    fn config(&self) -> ProgressConfig {
        if self.gated {
            ProgressConfig::gated()
        } else {
            ProgressConfig::default()
        }
    }
}

/// Where progress is kept: SQLite in memory or a database file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DbTarget {
    Memory,
    File(PathBuf),
}

impl DbTarget {
    /// Accepts `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare
    /// path. Relative paths resolve against the working directory.
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        let trimmed = raw.trim();
        if trimmed == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        let path = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);
        let path = path.split('?').next().unwrap_or_default();
        if path.is_empty() {
            return Err(ArgsError::InvalidDbUrl {
                raw: raw.to_string(),
            });
        }

        let path = Path::new(path);
        if path.is_absolute() {
            return Ok(Self::File(path.to_path_buf()));
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(Self::File(cwd.join(path)))
    }

    fn url(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::File(path) => format!("sqlite://{}", path.display()),
        }
    }

    /// SQLite will not create a missing file through a `sqlite://` URL.
    fn prepare(&self) -> std::io::Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(())
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn open_services(args: &Args) -> AppServices {
    let url = args.db.url();
    let opened = match args.db.prepare() {
        Ok(()) => AppServices::new_sqlite(&url, args.config())
            .await
            .map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };

    match opened {
        Ok(services) => services,
        Err(err) => {
            warn!(db = %url, error = %err, "database unavailable; progress kept in memory");
            AppServices::in_memory(args.config()).await
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = open_services(&args).await;
    let progress = services.progress();

    args.command.apply(&progress);
    progress.mark_rendered();
    print!("{}", render::render(&progress));

    progress.flush().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
