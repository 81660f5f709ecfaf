//! Model configuration.
//!
//! The backend is resolved in priority order:
//! 1. `--lm` CLI flag (local command)
//! 2. `lm_command` in the config file (`--config`, or
//!    `<config dir>/studyflow/config.json` when present)
//! 3. `STUDYFLOW_LM_COMMAND` environment variable
//! 4. Gemini over HTTPS, keyed by `GEMINI_API_KEY`, `GOOGLE_GENAI_API_KEY`
//!    or `GOOGLE_API_KEY`
//!
//! The model name follows the same flag > file > environment order; the API
//! base comes from the file or `STUDYFLOW_API_BASE`. The invocation log path
//! and its full-capture switch (`--lm-log-full`, `lm_log_full`,
//! `STUDYFLOW_LM_LOG_FULL`) follow flag > file > environment too.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const ENV_LM_COMMAND: &str = "STUDYFLOW_LM_COMMAND";
const ENV_MODEL: &str = "STUDYFLOW_MODEL";
const ENV_API_BASE: &str = "STUDYFLOW_API_BASE";
const ENV_LM_LOG: &str = "STUDYFLOW_LM_LOG";
const ENV_LM_LOG_FULL: &str = "STUDYFLOW_LM_LOG_FULL";
const ENV_API_KEYS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_GENAI_API_KEY", "GOOGLE_API_KEY"];

/// On-disk config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_log: Option<PathBuf>,
    /// Record full prompt and reply text in the invocation log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_log_full: Option<bool>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub lm_command: Option<String>,
    pub model: Option<String>,
    pub lm_log: Option<PathBuf>,
    pub lm_log_full: bool,
}

/// Where generation requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Gemini {
        model: String,
        api_base: String,
        api_key: String,
    },
    Command {
        command: String,
    },
}

/// Fully resolved model configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub backend: Backend,
    pub lm_log: Option<PathBuf>,
    pub lm_log_full: bool,
}

impl ModelConfig {
    /// Human-readable summary with secrets redacted.
    pub fn describe(&self) -> String {
        let mut lines = match &self.backend {
            Backend::Gemini {
                model, api_base, ..
            } => vec![
                "backend: gemini".to_string(),
                format!("model: {model}"),
                format!("api_base: {api_base}"),
                "api_key: (set)".to_string(),
            ],
            Backend::Command { command } => {
                vec!["backend: command".to_string(), format!("command: {command}")]
            }
        };
        if let Some(path) = &self.lm_log {
            lines.push(format!("lm_log: {}", path.display()));
            if self.lm_log_full {
                lines.push("lm_log_full: true".to_string());
            }
        }
        lines.join("\n")
    }
}

/// Default config location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("studyflow").join("config.json"))
}

/// Load and validate a config file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ConfigFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config_file(&config)?;
    Ok(config)
}

/// Load the explicitly requested config file, or the default one if it exists.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<ConfigFile>> {
    if let Some(path) = explicit {
        return load_config_file(path).map(Some);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config_file(&path).map(Some),
        _ => Ok(None),
    }
}

pub fn validate_config_file(config: &ConfigFile) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    for (label, value) in [
        ("model", &config.model),
        ("api_base", &config.api_base),
        ("lm_command", &config.lm_command),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(anyhow!("{label} must be non-empty when set"));
        }
    }
    if let Some(base) = config.api_base.as_deref() {
        if !base.starts_with("https://") && !base.starts_with("http://") {
            return Err(anyhow!("api_base must be an http(s) URL (got {base:?})"));
        }
    }
    Ok(())
}

/// Resolve the model configuration from flags, file, and environment.
///
/// `env` looks up an environment variable; empty values count as unset.
pub fn resolve(
    overrides: &Overrides,
    file: Option<&ConfigFile>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ModelConfig> {
    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let lm_log = overrides
        .lm_log
        .clone()
        .or_else(|| file.and_then(|f| f.lm_log.clone()))
        .or_else(|| env(ENV_LM_LOG).map(PathBuf::from));
    let lm_log_full = overrides.lm_log_full
        || file
            .and_then(|f| f.lm_log_full)
            .or_else(|| env(ENV_LM_LOG_FULL).map(|value| is_truthy(&value)))
            .unwrap_or(false);

    let command = overrides
        .lm_command
        .clone()
        .or_else(|| file.and_then(|f| f.lm_command.clone()))
        .or_else(|| env(ENV_LM_COMMAND));
    if let Some(command) = command {
        return Ok(ModelConfig {
            backend: Backend::Command { command },
            lm_log,
            lm_log_full,
        });
    }

    let model = overrides
        .model
        .clone()
        .or_else(|| file.and_then(|f| f.model.clone()))
        .or_else(|| env(ENV_MODEL))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let api_base = file
        .and_then(|f| f.api_base.clone())
        .or_else(|| env(ENV_API_BASE))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let api_key = ENV_API_KEYS
        .iter()
        .find_map(|name| env(name))
        .ok_or_else(|| {
            anyhow!(
                "no model configured: set {} or pass --lm <command>",
                ENV_API_KEYS.join(" / ")
            )
        })?;

    Ok(ModelConfig {
        backend: Backend::Gemini {
            model,
            api_base,
            api_key,
        },
        lm_log,
        lm_log_full,
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
