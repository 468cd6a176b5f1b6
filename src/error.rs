use thiserror::Error;

/// Unified error type for merge-to-master operations
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Operation cancelled: {0}")]
    UserAbort(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Command `{command}` failed with exit code {code}: {message}")]
    Command {
        command: String,
        code: i32,
        message: String,
    },

    #[error("Script `{script}` failed with exit code {code}")]
    Script { script: String, code: i32 },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the binary to pick its reporting style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserAbort,
    Precondition,
    ExternalCommand,
    Unexpected,
}

/// Convenience type alias for Results in merge-to-master
pub type Result<T> = std::result::Result<T, MergeError>;

impl MergeError {
    /// Create a user-abort error with context
    pub fn abort(msg: impl Into<String>) -> Self {
        MergeError::UserAbort(msg.into())
    }

    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        MergeError::Precondition(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        MergeError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        MergeError::Version(msg.into())
    }

    /// Create a parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        MergeError::Parse(msg.into())
    }

    /// Create a not-found error with context
    pub fn not_found(msg: impl Into<String>) -> Self {
        MergeError::NotFound(msg.into())
    }

    /// Create a failed-command error
    pub fn command(command: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        MergeError::Command {
            command: command.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a failed-script error
    pub fn script(script: impl Into<String>, code: i32) -> Self {
        MergeError::Script {
            script: script.into(),
            code,
        }
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        MergeError::Prompt(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::UserAbort(_) => ErrorKind::UserAbort,
            MergeError::Precondition(_) | MergeError::Config(_) | MergeError::Version(_) => {
                ErrorKind::Precondition
            }
            MergeError::Command { .. } | MergeError::Script { .. } => ErrorKind::ExternalCommand,
            MergeError::Parse(_)
            | MergeError::NotFound(_)
            | MergeError::Prompt(_)
            | MergeError::Io(_) => ErrorKind::Unexpected,
        }
    }

    /// Process exit code for this error. Every failure currently maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
