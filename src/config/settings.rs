//! TOML-based configuration.
//!
//! Supports a config file (tmdl.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [layout]
//! root_document = "model.tmdl"
//! definition_dir = "definition"
//!
//! [diff]
//! program = "${GIT_BIN}"
//! args = ["--no-pager", "diff", "--no-index", "-U0"]
//! timeout_secs = 30
//! chunk_bytes = 1024
//!
//! [format]
//! indent = "tabs"    # or a number of spaces, e.g. indent = 4
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::emitter::format::Indent;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the root document lives inside a model folder.
    pub layout: LayoutSettings,

    /// External diff program.
    pub diff: DiffSettings,

    /// Serializer output style.
    pub format: FormatSettings,
}

/// Model folder layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// File name of the root document.
    pub root_document: String,

    /// Project-style subfolder probed when the root document is absent.
    pub definition_dir: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            root_document: "model.tmdl".to_string(),
            definition_dir: "definition".to_string(),
        }
    }
}

/// Diff collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Program to run (supports ${ENV_VAR} expansion).
    pub program: String,

    /// Arguments placed before the two document paths.
    pub args: Vec<String>,

    /// Kill the program after this many seconds.
    pub timeout_secs: u64,

    /// Maximum bytes per streamed chunk.
    pub chunk_bytes: usize,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            args: vec![
                "--no-pager".to_string(),
                "diff".to_string(),
                "--no-index".to_string(),
                "-U0".to_string(),
            ],
            timeout_secs: 30,
            chunk_bytes: 1024,
        }
    }
}

impl DiffSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The program with environment variables expanded.
    pub fn resolved_program(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.program)
    }
}

/// Serializer output style.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FormatSettings {
    pub indent: IndentSetting,
}

/// `"tabs"` or a number of spaces.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IndentSetting {
    Spaces(usize),
    Named(String),
}

impl Default for IndentSetting {
    fn default() -> Self {
        IndentSetting::Named("tabs".to_string())
    }
}

impl IndentSetting {
    pub fn to_indent(&self) -> Result<Indent, SettingsError> {
        match self {
            IndentSetting::Spaces(0) => Err(SettingsError::InvalidConfig(
                "format.indent must be at least 1 space".to_string(),
            )),
            IndentSetting::Spaces(n) => Ok(Indent::Spaces(*n)),
            IndentSetting::Named(s) if s.eq_ignore_ascii_case("tabs") => Ok(Indent::Tabs),
            IndentSetting::Named(s) => Err(SettingsError::InvalidConfig(format!(
                "format.indent must be \"tabs\" or a number, got \"{}\"",
                s
            ))),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.format.indent.to_indent()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TMDL_CONFIG`
    /// 2. `./tmdl.toml`
    /// 3. `~/.config/tmdl/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TMDL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tmdl.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tmdl").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Indentation for emitted documents. Validated on load.
    pub fn indent(&self) -> Indent {
        self.format.indent.to_indent().unwrap_or_default()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
