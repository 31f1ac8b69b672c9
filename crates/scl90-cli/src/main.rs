//! SCL-90 - redemption-code gated symptom checklist
//!
//! The `scl90` command runs the questionnaire in a terminal and exposes the
//! administrator operations.
//!
//! ## Commands
//!
//! - `init`: Seed demo codes and the admin credential into a fresh data dir
//! - `admin issue` / `admin list`: Issue new codes or list existing ones
//! - `take`: Redeem a code and answer the questionnaire interactively
//! - `score`: Score a complete answers file without a session

mod interactive;
mod render;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scl90_core::{
    admin_login, interpret, issue_code, list_codes, redeem_code, score, AnswerSet,
    AssessmentSession, AuthContext, BootstrapConfig, Catalog, CodeRegistry, FsKvStore, KvStore,
};
use scl90_store::StoreConfig;
use tracing::{info, Level};

use crate::interactive::{run_session, Outcome};
use crate::render::{render_codes, render_report, OutputFormat};

#[derive(Parser)]
#[command(name = "scl90")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SCL-90 symptom checklist with redemption codes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding codes, credential and session progress
    #[arg(long, global = true, env = "SCL90_DATA_DIR", default_value = ".scl90")]
    data_dir: PathBuf,

    /// Item catalog (JSON)
    #[arg(
        long,
        global = true,
        env = "SCL90_CATALOG",
        default_value = "demos/catalog.json"
    )]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed demo codes and the default admin credential if missing
    Init,

    /// Administrator operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Redeem a code and take the questionnaire
    Take {
        /// 8-digit redemption code
        #[arg(short, long)]
        code: String,

        /// Report output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Score a complete answers file (`{"1": 3, "2": 1, ...}`)
    Score {
        /// Path to the answers JSON file
        answers: PathBuf,

        /// Report output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Issue new redemption codes
    Issue {
        /// Administrator password
        #[arg(short, long)]
        password: String,

        /// Number of codes to issue
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// List every code with its redemption state
    List {
        /// Administrator password
        #[arg(short, long)]
        password: String,

        /// Listing output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scl90_core::telemetry::init_tracing(cli.json, level);

    let store = open_store(&cli.data_dir)?;
    let registry = CodeRegistry::with_bootstrap(&store, BootstrapConfig::from_env());
    registry
        .ensure_bootstrap()
        .context("Failed to bootstrap code registry")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Init => cmd_init(&registry, &cli.data_dir, &mut out),
        Commands::Admin { action } => match action {
            AdminAction::Issue { password, count } => {
                cmd_admin_issue(&registry, &password, count, &mut out)
            }
            AdminAction::List { password, format } => {
                cmd_admin_list(&registry, &password, format, &mut out)
            }
        },
        Commands::Take { code, format } => {
            let catalog = load_catalog(&cli.catalog)?;
            let stdin = io::stdin();
            cmd_take(&registry, &catalog, &code, format, stdin.lock(), &mut out)
        }
        Commands::Score { answers, format } => {
            let catalog = load_catalog(&cli.catalog)?;
            cmd_score(&catalog, &answers, format, &mut out)
        }
    }
}

fn open_store(data_dir: &Path) -> Result<FsKvStore> {
    let config = StoreConfig {
        data_dir: data_dir.to_path_buf(),
        ..StoreConfig::from_env()
    };
    FsKvStore::from_config(&config)
        .with_context(|| format!("Failed to open data directory {:?}", data_dir))
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("Failed to load catalog {:?}", path))
}

/// Bootstrap already ran in `main`; report what the data dir now holds.
fn cmd_init<S: KvStore, W: Write>(
    registry: &CodeRegistry<S>,
    data_dir: &Path,
    out: &mut W,
) -> Result<()> {
    let summary = registry.summary()?;
    info!("Initialized data directory at {:?}", data_dir);
    writeln!(out, "Initialized SCL-90 data at {:?}", data_dir)?;
    writeln!(out, "{} codes ({} unused)", summary.total, summary.unused)?;
    Ok(())
}

fn cmd_admin_issue<S: KvStore, W: Write>(
    registry: &CodeRegistry<S>,
    password: &str,
    count: usize,
    out: &mut W,
) -> Result<()> {
    let mut ctx = AuthContext::new();
    admin_login(&mut ctx, registry, password)?;
    for _ in 0..count {
        let issued = issue_code(&ctx, registry).context("Failed to issue code")?;
        writeln!(out, "{}", issued.code)?;
    }
    Ok(())
}

fn cmd_admin_list<S: KvStore, W: Write>(
    registry: &CodeRegistry<S>,
    password: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let mut ctx = AuthContext::new();
    admin_login(&mut ctx, registry, password)?;
    let codes = list_codes(&ctx, registry)?;
    write!(out, "{}", render_codes(format, &codes)?)?;
    Ok(())
}

fn cmd_take<S: KvStore, R: BufRead, W: Write>(
    registry: &CodeRegistry<S>,
    catalog: &Catalog,
    code: &str,
    format: OutputFormat,
    input: R,
    out: &mut W,
) -> Result<()> {
    let mut ctx = AuthContext::new();
    redeem_code(&mut ctx, registry, code)?;

    let mut session = AssessmentSession::start(catalog, registry.store(), &ctx)?;
    info!(session_id = %session.id(), "Session started");

    match run_session(&mut session, input, out)? {
        Outcome::Submitted(report) => {
            let interpretation = interpret(&report, catalog);
            writeln!(out)?;
            write!(out, "{}", render_report(format, &report, &interpretation)?)?;
        }
        Outcome::Paused { answered, total } => {
            writeln!(
                out,
                "Progress saved ({answered}/{total} answered). Rerun `take` with a new code to continue."
            )?;
        }
    }
    Ok(())
}

fn cmd_score<W: Write>(
    catalog: &Catalog,
    answers_path: &Path,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let content = std::fs::read_to_string(answers_path)
        .with_context(|| format!("Failed to read answers file: {:?}", answers_path))?;
    let answers: AnswerSet = serde_json::from_str(&content)
        .with_context(|| format!("Invalid answers JSON in {:?}", answers_path))?;

    let report = score(&answers, catalog)?;
    let interpretation = interpret(&report, catalog);
    write!(out, "{}", render_report(format, &report, &interpretation)?)?;
    Ok(())
}
