use anyhow::{Context, Result, bail};
use fincat_export::{DEFAULT_CURRENCY_SYMBOL, SpreadsheetExporter};
use fincat_ingest::{DEFAULT_DESCRIPTION, Delimiter, Field, HeaderOverrides, ParseOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::state::{ensure_fincat_home, fincat_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserSection,
    /// Exact header names per field (`date = "Value Date"`), for banks the
    /// keyword heuristic gets wrong.
    pub columns: BTreeMap<String, String>,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    pub delimiter: Delimiter,
    pub description_placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            description_placeholder: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            description_placeholder: self.parser.description_placeholder.clone(),
        }
    }

    /// `[columns]` as a detector; unknown field keys are a config error.
    pub fn header_overrides(&self) -> Result<HeaderOverrides> {
        let mut overrides = HeaderOverrides::new();
        for (key, header) in &self.columns {
            let Some(field) = Field::from_key(key) else {
                let known: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
                bail!("unknown field `{key}` in [columns] (expected one of: {})", known.join(", "));
            };
            overrides = overrides.pin(field, header.as_str());
        }
        Ok(overrides)
    }

    pub fn exporter(&self) -> SpreadsheetExporter {
        SpreadsheetExporter::new(self.export.currency_symbol.as_str())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(fincat_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_fincat_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}
