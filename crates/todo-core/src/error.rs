use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DataDirUnavailable,
    AmbiguousId,
    InvalidFilter,
    PersistedDataCorrupt,
    StorageWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::DataDirUnavailable => "E1003",
            Self::AmbiguousId => "E2004",
            Self::InvalidFilter => "E2005",
            Self::PersistedDataCorrupt => "E3003",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DataDirUnavailable => "Data directory unavailable",
            Self::AmbiguousId => "Ambiguous item ID",
            Self::InvalidFilter => "Invalid filter value",
            Self::PersistedDataCorrupt => "Persisted to-do list is corrupt",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the todo config.toml and retry."),
            Self::DataDirUnavailable => {
                Some("Pass --data-dir or set TODO_DATA_DIR to a writable directory.")
            }
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::InvalidFilter => Some("Use one of: all, active, completed."),
            Self::PersistedDataCorrupt => {
                Some("The list was reset; the unreadable copy was kept next to the data file.")
            }
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `td` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures of the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The list could not be serialized.
    #[error("failed to encode to-do list: {0}")]
    Encode(#[from] serde_json::Error),

    /// Storage keys must be plain file-name-safe identifiers.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::StorageWriteFailed,
            Self::Encode(_) | Self::InvalidKey(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Why a persisted blob was rejected during load.
#[derive(Debug, thiserror::Error)]
pub enum CorruptData {
    #[error("blob is not a valid to-do list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate item id '{0}'")]
    DuplicateId(String),

    #[error("item '{0}' has blank text")]
    BlankText(String),
}

impl CorruptData {
    /// Always [`ErrorCode::PersistedDataCorrupt`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::PersistedDataCorrupt
    }
}
