//! Saved-route history file.

use anyhow::{Context, Result};
use evroute_core::RouteHistory;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_FILE: &str = "evroute-history.json";

/// `EVROUTE_HISTORY_PATH`, or `./evroute-history.json`.
pub fn history_path() -> PathBuf {
    env::var("EVROUTE_HISTORY_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE))
}

/// Load the history file. A missing file is an empty history.
pub fn load_history(path: &Path) -> Result<RouteHistory> {
    if !path.exists() {
        return Ok(RouteHistory::new());
    }
    let raw = fs::read(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(RouteHistory::new());
    }
    serde_json::from_slice(&raw)
        .with_context(|| format!("history file {} is not valid JSON", path.display()))
}

/// Write the history file through a temporary sibling, then rename it into place.
pub fn save_history(path: &Path, history: &RouteHistory) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(history)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace history file {}", path.display()))?;
    Ok(())
}
