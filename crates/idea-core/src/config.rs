use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "idea.yaml";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "GITHUB_API_URL";
pub const DEFAULT_MARKER_LABEL: &str = "idea-backlog";

// ---------------------------------------------------------------------------
// GithubConfig
// ---------------------------------------------------------------------------

/// Which open issues reconciliation is allowed to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileScope {
    /// Only issues carrying the marker label.
    #[default]
    Managed,
    /// Every open issue on the repository.
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default)]
    pub private: bool,
    #[serde(default = "default_marker_label")]
    pub marker_label: String,
    #[serde(default)]
    pub reconcile: ReconcileScope,
    #[serde(default = "default_true")]
    pub priority_labels: bool,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

fn default_marker_label() -> String {
    DEFAULT_MARKER_LABEL.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            private: false,
            marker_label: default_marker_label(),
            reconcile: ReconcileScope::default(),
            priority_labels: true,
        }
    }
}

// ---------------------------------------------------------------------------
// NamingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

fn default_max_len() -> usize {
    30
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn contains(&self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_issue_count")]
    pub issue_count: CountRange,
    #[serde(default = "default_true")]
    pub enforce_issue_count: bool,
    #[serde(default = "default_true")]
    pub reject_unknown_keys: bool,
}

fn default_issue_count() -> CountRange {
    CountRange { min: 15, max: 25 }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            issue_count: default_issue_count(),
            enforce_issue_count: true,
            reject_unknown_keys: true,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,
}

fn default_executable() -> String {
    "claude".to_string()
}

fn default_generator_timeout() -> u64 {
    600
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            model: None,
            max_turns: None,
            timeout_secs: default_generator_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides are applied afterwards.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_yaml(&data).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a sync misbehave silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.reconcile == ReconcileScope::Managed && self.github.marker_label.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "github.marker_label must not be empty when github.reconcile is 'managed'".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_yaml(data: &str) -> Result<Self, serde_yaml::Error> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(data)
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get(API_URL_ENV).filter(|s| !s.trim().is_empty()) {
            self.github.api_url = url.trim_end_matches('/').to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The tracker access token. Never printed: `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token once from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        get(TOKEN_ENV)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Self::new)
            .ok_or(ConfigError::MissingToken)
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
