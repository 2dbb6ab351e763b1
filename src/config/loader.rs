//! Configuration Loader
//!
//! Environment-aware loading built on the `config` crate: YAML files layered under
//! `SQL_ANALYST_*` environment variables, with the legacy `GROQ_API_KEY` and
//! `DATABASE_URL` variables honored as defaults.

use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::AnalystConfig;
use crate::constants::env_vars;

const CONFIG_FILE_STEM: &str = "sql-analyst";
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: AnalystConfig,
    environment: String,
    sources: Vec<PathBuf>,
}

impl ConfigManager {
    /// Load from `./config` and the process environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from_sources(None, Path::new("config"), &vars)
    }

    /// Load an explicit file, still layered under the process environment
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from_sources(Some(path), Path::new("config"), &vars)
    }

    /// Load with every input explicit.
    ///
    /// When `file` is given it must exist and the directory is not searched. Otherwise
    /// `{directory}/sql-analyst.yaml` and `{directory}/sql-analyst.{environment}.yaml`
    /// are used if present. `vars` stands in for the process environment.
    pub fn load_from_sources(
        file: Option<&Path>,
        directory: &Path,
        vars: &HashMap<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment(vars);
        let mut builder = Config::builder();

        if let Some(api_key) = Self::non_empty(vars, env_vars::LEGACY_API_KEY) {
            builder = builder.set_default("llm.api_key", api_key)?;
        }
        if let Some(url) = Self::non_empty(vars, env_vars::DATABASE_URL) {
            builder = builder.set_default("database.url", url)?;
        }

        let candidates = match file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigurationError::config_file_not_found(vec![
                        path.to_path_buf(),
                    ]));
                }
                vec![path.to_path_buf()]
            }
            None => vec![
                directory.join(format!("{CONFIG_FILE_STEM}.yaml")),
                directory.join(format!("{CONFIG_FILE_STEM}.{environment}.yaml")),
            ],
        };

        let mut sources = Vec::new();
        for path in candidates.into_iter().filter(|p| p.is_file()) {
            let content = Self::read_config_file_safely(&path)?;
            debug!(path = %path.display(), "Adding configuration file");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            sources.push(path);
        }

        builder = builder.add_source(
            Environment::with_prefix(env_vars::CONFIG_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        let config: AnalystConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %environment,
            config = %Self::sanitize_config_for_logging(&config),
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            sources,
        }))
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Files that contributed, in load order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Configuration as JSON with secrets masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// `SQL_ANALYST_ENV`, then `APP_ENV`, then `development`
    fn detect_environment(vars: &HashMap<String, String>) -> String {
        vars.get(env_vars::ENVIRONMENT)
            .or_else(|| vars.get(env_vars::APP_ENV))
            .map(|env| env.to_lowercase())
            .unwrap_or_else(|| "development".to_string())
    }

    fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        vars.get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                format!(
                    "Configuration file too large ({} bytes > {} byte limit)",
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                ),
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    fn sanitize_config_for_logging(config: &AnalystConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential", "auth"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        *val = match val {
                            serde_json::Value::Null => serde_json::Value::Null,
                            serde_json::Value::String(s) if s.is_empty() => {
                                serde_json::Value::String("[EMPTY]".to_string())
                            }
                            serde_json::Value::String(s) => {
                                let chars: Vec<char> = s.chars().collect();
                                let masked = if chars.len() > 4 {
                                    let head: String = chars[..2].iter().collect();
                                    let tail: String = chars[chars.len() - 2..].iter().collect();
                                    format!("{head}***{tail}")
                                } else {
                                    "***".to_string()
                                };
                                serde_json::Value::String(format!("[MASKED: {masked}]"))
                            }
                            _ => serde_json::Value::String("[MASKED]".to_string()),
                        };
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}
