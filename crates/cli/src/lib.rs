pub mod commands;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use basketry_core::config::{AppConfig, LoadOptions, LogFormat};
use basketry_core::RuleMetric;
use clap::{Parser, Subcommand};

use crate::commands::propose::ProposeRequest;

#[derive(Debug, Parser)]
#[command(
    name = "basketry",
    about = "Basketry market-basket CLI",
    long_about = "Deduplicate tabular data and propose product bundles from association rules mined upstream.",
    after_help = "Examples:\n  basketry propose --rules rules.json --cart bread,milk\n  basketry dedupe --input orders.json --output orders.clean.json\n  basketry config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (default: basketry.toml or config/basketry.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Count, remove and recount duplicate rows of a JSON table")]
    Dedupe {
        #[arg(long, help = "Table JSON: {\"columns\": [...], \"rows\": [[...], ...]}")]
        input: PathBuf,
        #[arg(long, help = "Write the cleaned table here instead of printing it")]
        output: Option<PathBuf>,
    },
    #[command(about = "Propose items to bundle with a cart from association rules")]
    Propose {
        #[arg(long, help = "Rule records JSON (antecedents, consequents, support, confidence, lift)")]
        rules: PathBuf,
        #[arg(long, value_delimiter = ',', help = "Cart items, comma separated or repeated")]
        cart: Vec<String>,
        #[arg(
            long,
            conflicts_with = "all",
            value_parser = parse_limit,
            help = "Maximum number of proposed items"
        )]
        limit: Option<usize>,
        #[arg(long, help = "Return every matching item")]
        all: bool,
        #[arg(long, value_parser = parse_metric, help = "Rank rules by support|confidence|lift first")]
        sort_by: Option<RuleMetric>,
    },
    #[command(about = "List the single antecedent item of every rule")]
    Antecedents {
        #[arg(long)]
        rules: PathBuf,
    },
    #[command(about = "One-hot encode transactions over their item universe")]
    Encode {
        #[arg(long, help = "Transactions JSON: [[item, ...], ...]")]
        transactions: PathBuf,
    },
    #[command(about = "Filter externally mined rules by the configured thresholds")]
    Mine {
        #[arg(long)]
        rules: PathBuf,
        #[arg(long)]
        transactions: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn parse_metric(value: &str) -> Result<RuleMetric, String> {
    value.parse()
}

fn parse_limit(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("limit must be at least 1 (use --all to keep every item)".to_string()),
        Ok(limit) => Ok(limit),
        Err(error) => Err(format!("invalid limit `{value}`: {error}")),
    }
}

pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() };

    // Config errors surface through the command itself.
    let logging_config = AppConfig::load(options.clone()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Dedupe { input, output } => commands::dedupe::run(&input, output.as_deref()),
        Command::Propose { rules, cart, limit, all, sort_by } => {
            commands::propose::run(&ProposeRequest { rules, cart, limit, all, sort_by }, options)
        }
        Command::Antecedents { rules } => commands::antecedents::run(&rules),
        Command::Encode { transactions } => commands::encode::run(&transactions),
        Command::Mine { rules, transactions } => {
            commands::mine::run(&rules, &transactions, options)
        }
        Command::Config => commands::config::run(options),
    };

    writeln!(io::stdout().lock(), "{}", result.output).context("failed to write command output")?;
    Ok(ExitCode::from(result.exit_code))
}
