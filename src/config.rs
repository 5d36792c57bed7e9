use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::translate::interface::ModelSpec;
use crate::translate::preset::PresetName;
use crate::utils::sentence_divider::DEFAULT_MAX_CHUNK_LENGTH;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("static pattern"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub model_config: ModelConfig,
}

/// Which flavour of `/translate` the server exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMode {
    /// Uncached, reports `processing_time`
    #[default]
    Standard,
    /// LRU cached, plus `/logs` and request timing
    Cached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub service_mode: ServiceMode,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_config_name")]
    pub default_config: String,
    #[serde(default = "default_warmup_on_start")]
    pub warmup_on_start: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_file_name() -> String {
    "api_logs.log".to_string()
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_config_name() -> String {
    PresetName::Default.as_str().to_string()
}

fn default_warmup_on_start() -> bool {
    true
}

impl SystemConfig {
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(&self.log_dir).join(&self.log_file_name)
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_mode: ServiceMode::default(),
            log_dir: default_log_dir(),
            log_file_name: default_log_file_name(),
            cache_capacity: default_cache_capacity(),
            default_config: default_config_name(),
            warmup_on_start: default_warmup_on_start(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    #[serde(default = "default_tgt_lang")]
    pub tgt_lang: String,
    /// `auto`, `cpu` or `cuda`
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_inference_url")]
    pub inference_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,
}

fn default_model_name() -> String {
    "facebook/mbart-large-50-many-to-many-mmt".to_string()
}

fn default_src_lang() -> String {
    "hi_IN".to_string()
}

fn default_tgt_lang() -> String {
    "en_XX".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_inference_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_CHUNK_LENGTH
}

impl ModelConfig {
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            model_name: self.model_name.clone(),
            src_lang: self.src_lang.clone(),
            tgt_lang: self.tgt_lang.clone(),
            device: self.device.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            src_lang: default_src_lang(),
            tgt_lang: default_tgt_lang(),
            device: default_device(),
            inference_url: default_inference_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_chunk_length: default_max_chunk_length(),
        }
    }
}

impl Config {
    /// Load a YAML or JSON config file, substituting `${VAR}` placeholders.
    ///
    /// Not validated here: environment overrides apply first, then `validate`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Err(ConfigError::NotFound(path.to_string()));
        }

        let content = read_text_file(path)?;
        let content = substitute_env_vars(&content);

        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        Ok(config)
    }

    /// Load from `CONFIG_PATH` or the first candidate path that exists.
    ///
    /// Falls back to the built-in defaults when no file is found. A file that
    /// exists but does not parse is an error.
    pub fn discover() -> Result<(Self, Option<String>), ConfigError> {
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        let config_paths: Vec<String> = vec![
            Some("conf.yaml".to_string()),
            Some("conf.json".to_string()),
            exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
            exe_dir.join("conf.json").to_str().map(|s| s.to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        for path in config_paths {
            match Self::load(&path) {
                Ok(config) => return Ok((config, Some(path))),
                Err(ConfigError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok((Self::default(), None))
    }

    /// Apply environment overrides that take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("INFERENCE_SERVICE_URL") {
            self.model_config.inference_url = url;
        }
        if let Ok(device) = std::env::var("MODEL_DEVICE") {
            self.model_config.device = device;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.system_config.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_config.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        self.cache_capacity()?;
        if self.model_config.max_chunk_length == 0 {
            return Err(ConfigError::Invalid(
                "max_chunk_length must be greater than zero".to_string(),
            ));
        }
        self.default_preset()?;
        if !matches!(self.model_config.device.as_str(), "auto" | "cpu" | "cuda") {
            return Err(ConfigError::Invalid(format!(
                "device must be one of auto, cpu, cuda (got {})",
                self.model_config.device
            )));
        }
        let url = &self.model_config.inference_url;
        if url.contains("${") || !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "inference_url must be an http(s) URL (got {})",
                url
            )));
        }
        Ok(())
    }

    pub fn cache_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.system_config.cache_capacity).ok_or_else(|| {
            ConfigError::Invalid("cache_capacity must be greater than zero".to_string())
        })
    }

    pub fn default_preset(&self) -> Result<PresetName, ConfigError> {
        self.system_config
            .default_config
            .parse()
            .map_err(|e: crate::translate::preset::PresetError| ConfigError::Invalid(e.to_string()))
    }
}

/// Replace `${VAR}` with the environment value, leaving unknown variables as-is.
fn substitute_env_vars(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read a text file as UTF-8, stripping a BOM; fall back to lossy decoding.
fn read_text_file(path: &str) -> Result<String, ConfigError> {
    let mut bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;

    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let (cow, _, _) = encoding_rs::UTF_8.decode(e.as_bytes());
            Ok(cow.into_owned())
        }
    }
}
