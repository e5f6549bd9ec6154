use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fincat_ingest::{CsvParser, Delimiter, HeaderOverrides, ParseOutcome, decode::decode_statement};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "fincat",
    version,
    about = "Bank statement CSV ingestion for UK business accounts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement CSV and show transactions plus row errors
    Parse {
        file: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// comma, semicolon, tab, pipe or auto (default: from config)
        #[arg(long)]
        delimiter: Option<Delimiter>,
    },

    /// Show which column each transaction field was detected in
    Columns {
        file: PathBuf,

        #[arg(long)]
        delimiter: Option<Delimiter>,
    },

    /// Parse a statement and write the bookkeeping spreadsheet CSV
    Export {
        file: PathBuf,

        /// Output path (default: <stem>-export.csv next to the input)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        delimiter: Option<Delimiter>,
    },

    /// Manage ~/.fincat/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config();
    init_logging(cfg.as_ref().map(|c| c.logging.level.as_str()).unwrap_or("info"));
    let cfg = cfg?;

    match cli.command {
        Command::Parse {
            file,
            json,
            delimiter,
        } => parse(&cfg, &file, json, delimiter),
        Command::Columns { file, delimiter } => columns(&cfg, &file, delimiter),
        Command::Export {
            file,
            out,
            delimiter,
        } => export(&cfg, &file, out, delimiter),
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => {
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                Ok(())
            }
            ConfigCommand::Path => {
                println!("{}", config::config_path()?.display());
                Ok(())
            }
        },
    }
}

/// `FINCAT_LOG` wins over the config level. Logs go to stderr so
/// `--json` output stays clean.
fn init_logging(config_level: &str) {
    let filter = EnvFilter::try_from_env("FINCAT_LOG")
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parser_for(cfg: &Config, delimiter: Option<Delimiter>) -> Result<CsvParser<HeaderOverrides>> {
    Ok(CsvParser::new()
        .with_delimiter(delimiter.unwrap_or(cfg.parser.delimiter))
        .with_options(cfg.parse_options())
        .with_detector(cfg.header_overrides()?))
}

fn parse(cfg: &Config, file: &Path, json: bool, delimiter: Option<Delimiter>) -> Result<()> {
    let result = parser_for(cfg, delimiter)?.parse_path(file);

    if json {
        let report = report::ParseReport::new(&result);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::ParseView(&result));
    }

    if result.outcome() == ParseOutcome::Rejected {
        bail!(
            "{} rejected: {} errors and no usable transactions",
            file.display(),
            result.errors.len()
        );
    }
    Ok(())
}

fn columns(cfg: &Config, file: &Path, delimiter: Option<Delimiter>) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let decoded = decode_statement(&bytes);
    let layout = parser_for(cfg, delimiter)?
        .layout(&decoded.text)
        .with_context(|| format!("reading header row of {}", file.display()))?;
    print!("{}", report::LayoutView(&layout));
    Ok(())
}

fn export(
    cfg: &Config,
    file: &Path,
    out: Option<PathBuf>,
    delimiter: Option<Delimiter>,
) -> Result<()> {
    let result = parser_for(cfg, delimiter)?.parse_path(file);
    match result.outcome() {
        ParseOutcome::Rejected => bail!(
            "{} rejected, nothing exported: {}",
            file.display(),
            result.errors.join("; ")
        ),
        ParseOutcome::Partial => warn!(
            skipped = result.rows_rejected(),
            "exporting without rows that failed to parse"
        ),
        ParseOutcome::Clean => {}
    }

    let out = out.unwrap_or_else(|| default_export_path(file));
    let written = cfg.exporter().write_path(&out, &result.transactions)?;
    info!(input = %file.display(), "export complete");
    println!("Wrote {written} transactions to {}", out.display());
    Ok(())
}

fn default_export_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string());
    input.with_file_name(format!("{stem}-export.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_path() {
        assert_eq!(
            default_export_path(Path::new("/tmp/stmts/jan.csv")),
            PathBuf::from("/tmp/stmts/jan-export.csv")
        );
        assert_eq!(
            default_export_path(Path::new("march")),
            PathBuf::from("march-export.csv")
        );
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli =
            Cli::try_parse_from(["fincat", "parse", "a.csv", "--json", "--delimiter", "auto"])
                .unwrap();
        match cli.command {
            Command::Parse { file, json, delimiter } => {
                assert_eq!(file, PathBuf::from("a.csv"));
                assert!(json);
                assert_eq!(delimiter, Some(Delimiter::Auto));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["fincat", "parse", "a.csv", "--delimiter", "space"]).is_err());
    }
}
