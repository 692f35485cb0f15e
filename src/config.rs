use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{sxlog_debug, Error, Result};

/// Directory under `$HOME` holding config, identity, events and the log.
pub const APP_DIR: &str = ".syntaxlab";

const DEFAULT_PASSWORD: &str = "made24";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Directory with `syntax-data1.csv` and `syntax-data2.csv` replacing the
    /// bundled tables.
    pub data_dir: Option<String>,
    /// Where timed events are appended. Defaults to `~/.syntaxlab/events.jsonl`.
    pub events_path: Option<String>,
    /// Task password handed out by the experiment host.
    pub password: Option<String>,
    #[serde(default)]
    pub show_header: bool,
}

impl Config {
    pub fn app_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(APP_DIR))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("syntaxlab.toml"))
    }

    pub fn identity_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("identity.json"))
    }

    pub fn events_path(&self) -> Result<PathBuf> {
        match &self.events_path {
            Some(path) => Ok(expand_tilde(path)),
            None => Ok(Self::app_dir()?.join("events.jsonl")),
        }
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(expand_tilde)
    }

    pub fn effective_password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        sxlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            sxlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        sxlog_debug!(
            "Config loaded: data_dir={:?} events_path={:?} show_header={}",
            config.data_dir,
            config.events_path,
            config.show_header
        );
        Ok(config)
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        let app_dir = Self::app_dir()?;
        if !app_dir.exists() {
            sxlog_debug!("Creating app directory: {}", app_dir.display());
            fs::create_dir_all(&app_dir)?;
        }
        if let Some(parent) = self.events_path()?.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
