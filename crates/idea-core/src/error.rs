use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType,
    TooShort,
    OutOfRange,
    InvalidEnum,
    UnknownKey,
    IssueCount,
}

/// One violated constraint, located by a path such as `issues[3].title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generated design failed validation ({} violation(s)): {}", .violations.len(), join(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// True if any violation is located exactly at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// GenerateError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("idea must be at least {min} characters long (got {got})")]
    IdeaTooShort { min: usize, got: usize },

    #[error("design generator failed: {0}")]
    Generator(String),

    #[error("generator output is not valid JSON: {0}")]
    Parse(serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// TrackerError: transport-level failure talking to the remote tracker
// ---------------------------------------------------------------------------

// Messages carry their cause inline because per-item failures are recorded
// by `Display` alone; no variant exposes a `source`.

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode tracker response: {0}")]
    Decode(String),

    #[error("invalid request header: {0}")]
    Header(reqwest::header::InvalidHeaderValue),
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        TrackerError::Http(e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for TrackerError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        TrackerError::Header(e)
    }
}

impl TrackerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Status { status, .. } => Some(*status),
            TrackerError::Http(e) => e.status().map(|s| s.as_u16()),
            TrackerError::Decode(_) | TrackerError::Header(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SyncError: fatal causes that abort a sync run
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid repository name '{0}': the idea produced no usable characters")]
    InvalidRepoName(String),

    #[error("failed to resolve the authenticated user")]
    Identity(#[source] TrackerError),

    #[error("failed to create repository '{name}'")]
    CreateRepo {
        name: String,
        #[source]
        source: TrackerError,
    },

    #[error("repository name '{name}' is taken but {owner}/{name} could not be fetched")]
    UnexplainedConflict {
        owner: String,
        name: String,
        #[source]
        source: TrackerError,
    },
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN not found in environment")]
    MissingToken,

    #[error("failed to read config {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// IdeaError: umbrella for callers that mix concerns
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IdeaError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdeaError>;
