use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$FINCAT_HOME`, or `~/.fincat`.
pub fn fincat_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("FINCAT_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set FINCAT_HOME)")?;
    Ok(PathBuf::from(home).join(".fincat"))
}

pub fn ensure_fincat_home() -> Result<PathBuf> {
    let dir = fincat_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
