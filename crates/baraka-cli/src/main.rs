mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{completions, customers, phone, Context};
use crate::error::{exit_code_for, report_error};
use baraka_config as config;
use baraka_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "baraka", version, about = "baraka loyalty CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    /// Strip a phone number down to digits and a leading plus
    Normalize(phone::NormalizeArgs),
    /// List every spelling a lookup will try
    Variants(phone::VariantsArgs),
    /// Find the row whose phone matches any variant
    Lookup(phone::LookupArgs),
    #[command(name = "add-customer")]
    AddCustomer(customers::AddCustomerArgs),
    List,
    Show(customers::ShowArgs),
    #[command(name = "set-phone")]
    SetPhone(customers::SetPhoneArgs),
    #[command(name = "add-points")]
    AddPoints(customers::AddPointsArgs),
    Delete(customers::DeleteArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Normalize(args) => phone::normalize(args, json),
        Command::Variants(args) => phone::variants(args, json),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }
            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
            debug!(path = %db_path.display(), "database path resolved");

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
            };

            match command {
                Command::Lookup(args) => phone::lookup(&ctx, args),
                Command::AddCustomer(args) => customers::add_customer(&ctx, args),
                Command::List => customers::list_customers(&ctx),
                Command::Show(args) => customers::show_customer(&ctx, args),
                Command::SetPhone(args) => customers::set_phone(&ctx, args),
                Command::AddPoints(args) => customers::add_points(&ctx, args),
                Command::Delete(args) => customers::delete_customer(&ctx, args),
                Command::Completions(_) | Command::Normalize(_) | Command::Variants(_) => {
                    unreachable!("store-free commands handled before store initialization")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
