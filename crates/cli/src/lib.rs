pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use cartsim_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cartsim",
    about = "Synthetic cart-session generator for add-on recommendation data",
    long_about = "Generate labeled cart/candidate events, summarize event files, and inspect the catalog and configuration.",
    after_help = "Examples:\n  cartsim generate --users 500 --days 14\n  cartsim summarize --input cartsim_events.jsonl\n  cartsim config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Generate sessions and write candidate events as JSON Lines")]
    Generate {
        #[arg(long, help = "Path to a cartsim.toml file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Base seed for every random stream")]
        seed: Option<u64>,
        #[arg(long, help = "Number of synthetic users")]
        users: Option<usize>,
        #[arg(long, help = "Length of the order window in days")]
        days: Option<u32>,
        #[arg(long, help = "First day of the window (YYYY-MM-DD)")]
        start_date: Option<NaiveDate>,
        #[arg(long, help = "Destination JSONL file")]
        output: Option<PathBuf>,
        #[arg(long, help = "Log level (trace|debug|info|warn|error)")]
        log_level: Option<String>,
    },
    #[command(about = "Summarize an existing JSONL event file")]
    Summarize {
        #[arg(long, help = "JSONL file produced by `generate`")]
        input: PathBuf,
    },
    #[command(about = "Show statistics for the built-in menu catalog")]
    Catalog,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config {
        #[arg(long, help = "Path to a cartsim.toml file")]
        config: Option<PathBuf>,
    },
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // stdout carries the JSON results, so logs go to stderr.
    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .compact()
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .pretty()
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .json()
                .init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let (config_path, log_level) = match &cli.command {
        Command::Generate { config, log_level, .. } => (config.clone(), log_level.clone()),
        Command::Config { config } => (config.clone(), None),
        Command::Summarize { .. } | Command::Catalog => (None, None),
    };
    let logging_config = AppConfig::load(LoadOptions {
        config_path,
        overrides: ConfigOverrides { log_level, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    })
    .unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Generate { config, seed, users, days, start_date, output, log_level } => {
            commands::generate::run(LoadOptions {
                config_path: config,
                require_file: false,
                overrides: ConfigOverrides {
                    seed,
                    users,
                    days,
                    start_date,
                    output_path: output,
                    log_level,
                },
            })
        }
        Command::Summarize { input } => commands::summarize::run(&input),
        Command::Catalog => commands::catalog::run(),
        Command::Config { config } => commands::config::run(config),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
