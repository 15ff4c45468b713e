use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

use crate::file_utils::FileManager;
use crate::translation::QuoteOrder;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Where the dataset comes from and where it is loaded
    #[serde(default)]
    pub data: DataConfig,

    /// Decoding parameters sent with every completion request
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Provider selection and credentials
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Order in which column names are quoted in generated SQL
    #[serde(default)]
    pub quote_order: QuoteOrder,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether the provider is a hosted API that needs a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }

    /// Environment variable consulted when the config file has no key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Per-provider connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ProviderKind) -> Self {
        let endpoint = match provider_type {
            ProviderKind::OpenAI => default_openai_endpoint(),
            ProviderKind::Anthropic => default_anthropic_endpoint(),
            ProviderKind::Ollama => default_ollama_endpoint(),
            ProviderKind::LMStudio => default_lmstudio_endpoint(),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Provider selection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
    /// Provider to use
    #[serde(default)]
    pub active: ProviderKind,

    /// Known providers and their settings
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            active: ProviderKind::default(),
            available_providers: vec![
                ProviderConfig::new(ProviderKind::OpenAI),
                ProviderConfig::new(ProviderKind::Anthropic),
                ProviderConfig::new(ProviderKind::Ollama),
                ProviderConfig::new(ProviderKind::LMStudio),
            ],
        }
    }
}

impl ProviderSettings {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.active)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &ProviderKind) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the API key for the active provider
    ///
    /// Falls back to the provider's environment variable when the config
    /// file leaves the key empty.
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.active
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        ProviderConfig::new(self.active.clone()).endpoint
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

/// Decoding parameters for a completion request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Model name (e.g. "gpt-3.5-turbo")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; 0 keeps the output deterministic
    #[serde(default)]
    pub temperature: f32,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub frequency_penalty: f32,

    #[serde(default)]
    pub presence_penalty: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl CompletionConfig {
    /// Create a config for the given model with default decoding parameters
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("Completion model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow!("Temperature must be between 0 and 2, got {}", self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than 0"));
        }
        if !(-2.0..=2.0).contains(&self.frequency_penalty) {
            return Err(anyhow!(
                "frequency_penalty must be between -2 and 2, got {}",
                self.frequency_penalty
            ));
        }
        if !(-2.0..=2.0).contains(&self.presence_penalty) {
            return Err(anyhow!(
                "presence_penalty must be between -2 and 2, got {}",
                self.presence_penalty
            ));
        }
        Ok(())
    }
}

/// Dataset configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory scanned for CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Table the CSV files are loaded into and queried through
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// SQLite database file; in-memory when absent
    #[serde(default)]
    pub database_path: Option<String>,

    /// Rows printed before the result table is elided
    #[serde(default = "default_max_display_rows")]
    pub max_display_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            table_name: default_table_name(),
            database_path: None,
            max_display_rows: default_max_display_rows(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_table_name() -> String {
    "chicago_crime".to_string()
}

fn default_max_display_rows() -> usize {
    40
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Whether `name` can be used unquoted as a table name
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

impl Config {
    /// Load the configuration from a JSON file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            debug!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !is_plain_identifier(&self.data.table_name) {
            return Err(anyhow!(
                "Table name '{}' must start with a letter or underscore and contain only letters, digits and underscores",
                self.data.table_name
            ));
        }

        self.completion.validate()?;

        let endpoint = self.provider.get_endpoint();
        Url::parse(&endpoint).with_context(|| format!("Invalid provider endpoint: {}", endpoint))?;

        // Hosted providers need a key before any request is made
        if self.provider.active.requires_api_key() && self.provider.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (set it in the config file or {})",
                self.provider.active.display_name(),
                self.provider.active.api_key_env_var().unwrap_or("the environment")
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig::default(),
            completion: CompletionConfig::default(),
            provider: ProviderSettings::default(),
            quote_order: QuoteOrder::default(),
            log_level: LogLevel::default(),
        }
    }
}
