//! `roster` command-line entry point.
//!
//! # Responsibility
//! - Open the member store (file or in-memory) and run one command on it.
//! - Print command results as JSON on stdout, errors on stderr.

use clap::{Parser, Subcommand};
use log::error;
use roster_core::{
    default_log_level, init_logging, list_members, open_db, open_db_in_memory, seed_demo_members,
    MemberRepository, MemberService, PagingConfig, SqliteMemberRepository, DEMO_MEMBER_COUNT,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "roster", version, about = "Paged member queries over a SQLite roster")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "ROSTER_DB",
        help = "SQLite database file; an in-memory store is used when omitted"
    )]
    db: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "ROSTER_LOG_DIR",
        help = "Absolute directory for rolling log files; logging is off when omitted"
    )]
    log_dir: Option<String>,
    #[arg(
        long,
        global = true,
        env = "ROSTER_LOG_LEVEL",
        help = "trace|debug|info|warn|error"
    )]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print core liveness and version")]
    Ping,
    #[command(about = "Insert demo members user0..user{count-1}, aged by index")]
    Seed {
        #[arg(long, default_value_t = DEMO_MEMBER_COUNT)]
        count: usize,
    },
    #[command(about = "List one page of members as JSON")]
    Members {
        #[arg(
            long,
            default_value = "",
            help = "Listing query string, e.g. \"page=1&size=3&sort=username,desc\""
        )]
        query: String,
        #[arg(long, help = "Seed this many demo members first")]
        seed: Option<usize>,
    },
    #[command(about = "Add one year to every member at or above --min-age")]
    BulkAgePlus {
        #[arg(long)]
        min_age: i32,
        #[arg(long, help = "Seed this many demo members first")]
        seed: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Value, String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Command::Ping => Ok(ping_report()),
        command => run_on_store(cli.db.as_deref(), command),
    }
}

fn ping_report() -> Value {
    json!({
        "ping": roster_core::ping(),
        "version": roster_core::core_version(),
    })
}

fn run_on_store(db: Option<&Path>, command: Command) -> Result<Value, String> {
    let conn = match db {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let repo = SqliteMemberRepository::try_new(&conn).map_err(|err| err.to_string())?;

    match command {
        Command::Ping => Ok(ping_report()),
        Command::Seed { count } => {
            let seeded = seed_demo_members(&repo, count).map_err(|err| err.to_string())?;
            let total = repo.count().map_err(|err| err.to_string())?;
            Ok(json!({ "seeded": seeded.len(), "total": total }))
        }
        Command::Members { query, seed } => {
            seed_first(&repo, seed)?;
            let service = MemberService::new(repo);
            let listing = list_members(&service, &query, &PagingConfig::default())
                .map_err(|err| err.to_string())?;
            serde_json::to_value(listing).map_err(|err| err.to_string())
        }
        Command::BulkAgePlus { min_age, seed } => {
            seed_first(&repo, seed)?;
            let service = MemberService::new(repo);
            let affected = service
                .bulk_age_plus(min_age)
                .map_err(|err| err.to_string())?;
            Ok(json!({ "minAge": min_age, "affected": affected }))
        }
    }
}

fn seed_first(repo: &SqliteMemberRepository<'_>, count: Option<usize>) -> Result<(), String> {
    if let Some(count) = count {
        seed_demo_members(repo, count).map_err(|err| err.to_string())?;
    }
    Ok(())
}
