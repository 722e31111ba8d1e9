use std::fmt;
use std::path::PathBuf;

/// Which upstream payload an envelope error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Manga,
    Chapter,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Manga => f.write_str("manga"),
            PayloadKind::Chapter => f.write_str("chapter"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("invalid {kind} json: missing or empty `{key}`")]
    InvalidPayload { kind: PayloadKind, key: &'static str },

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` is not {expected}")]
    InvalidType { field: String, expected: &'static str },

    #[error("field `{field}` is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl MappingError {
    /// Prefix the offending field path with the container it was read from.
    pub(crate) fn within(self, parent: &str) -> Self {
        let join = |field: String| format!("{parent}.{field}");
        match self {
            MappingError::MissingField(field) => MappingError::MissingField(join(field)),
            MappingError::InvalidType { field, expected } => MappingError::InvalidType { field: join(field), expected },
            MappingError::InvalidValue { field, reason } => MappingError::InvalidValue { field: join(field), reason },
            other => other,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("encryption key is empty")]
    EmptyKey,

    #[error("invalid encryption key: {0}")]
    InvalidKey(#[from] hex::FromHexError),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("failed to parse response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ApiError {
    /// HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("could not determine a configuration directory")]
    NoConfigDir,
}
