//! Almanac field pipeline CLI.
//!
//! Fetches the almanac for a date, keeps the configured fields, adds the day's
//! void branches, and prints the `{status, data}` result as JSON.

use std::path::{Path, PathBuf};

use almanac::core::sexagenary::void_branches_for_code;
use almanac::core::types::{OutputFormat, PipelineResult};
use almanac::exit_codes;
use almanac::io::config::{DEFAULT_CONFIG_FILE, init_config, load_config};
use almanac::io::fetch::{FileFetcher, HttpFetcher};
use almanac::logging;
use almanac::pipeline::{DATE_FORMAT, Pipeline};
use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "almanac",
    version,
    about = "Filter, annotate and translate daily almanac records"
)]
struct Cli {
    /// Config file (defaults apply when it does not exist).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Emit pipeline debug traces on stderr (ignored when `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a commented default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run the pipeline for one date and print the result JSON.
    Process {
        /// Date to look up (YYYY-MM-DD). Defaults to today.
        #[arg(long, conflicts_with = "tomorrow")]
        date: Option<String>,

        /// Look up tomorrow's date.
        #[arg(long)]
        tomorrow: bool,

        /// Read a saved upstream response instead of calling the API.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Override the configured output format.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Print the void branches (kong wang) of a stem-branch code such as 甲子.
    KongWang { code: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Process {
            date,
            tomorrow,
            input,
            format,
        } => cmd_process(&cli.config, date, tomorrow, input, format),
        Command::KongWang { code } => cmd_kong_wang(&code),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if init_config(config_path, force)? {
        println!("wrote {}", config_path.display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_process(
    config_path: &Path,
    date: Option<String>,
    tomorrow: bool,
    input: Option<PathBuf>,
    format: Option<FormatArg>,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let mut pipeline = Pipeline::from_config(&cfg);
    if let Some(format) = format {
        pipeline = pipeline.with_format(format.into());
    }

    let date = match date {
        Some(date) => date,
        None => target_date(Local::now().date_naive(), tomorrow)?,
    };
    debug!(%date, input = ?input, "processing");

    let result = match input {
        Some(path) => pipeline.process(&FileFetcher::new(path), &date),
        None => pipeline.process(&HttpFetcher::from_config(&cfg.upstream), &date),
    };
    print_result(&result)?;

    Ok(if result.is_success() {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}

fn cmd_kong_wang(code: &str) -> Result<i32> {
    let voids = void_branches_for_code(code.trim())?;
    println!("{voids}");
    Ok(exit_codes::OK)
}

/// `today` (or the day after) as `YYYY-MM-DD`.
fn target_date(today: NaiveDate, tomorrow: bool) -> Result<String> {
    let date = if tomorrow {
        today
            .checked_add_days(Days::new(1))
            .context("date out of range")?
    } else {
        today
    };
    Ok(date.format(DATE_FORMAT).to_string())
}

fn print_result(result: &PipelineResult) -> Result<()> {
    let payload = serde_json::to_string_pretty(result).context("serialize result json")?;
    println!("{payload}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_process_defaults() {
        let cli = Cli::parse_from(["almanac", "process"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(matches!(
            cli.command,
            Command::Process {
                date: None,
                tomorrow: false,
                input: None,
                format: None,
            }
        ));
    }

    #[test]
    fn parse_process_with_input_and_format() {
        let cli = Cli::parse_from([
            "almanac",
            "process",
            "--date",
            "2024-12-26",
            "--input",
            "sample.json",
            "--format",
            "json",
        ]);
        let Command::Process {
            date,
            input,
            format,
            ..
        } = cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(date.as_deref(), Some("2024-12-26"));
        assert_eq!(input, Some(PathBuf::from("sample.json")));
        assert!(matches!(format, Some(FormatArg::Json)));
    }

    #[test]
    fn date_and_tomorrow_conflict() {
        let parsed =
            Cli::try_parse_from(["almanac", "process", "--date", "2024-12-26", "--tomorrow"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parse_init_force_and_global_config() {
        let cli = Cli::parse_from(["almanac", "init", "--force", "--config", "custom.toml"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn tomorrow_rolls_over_year_end() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).expect("date");
        assert_eq!(target_date(today, false).expect("today"), "2024-12-31");
        assert_eq!(target_date(today, true).expect("tomorrow"), "2025-01-01");
    }
}
