//! Error taxonomy for alias routing

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for usage errors (unknown alias, missing ID)
pub const EXIT_USAGE: i32 = 2;
/// Exit status when the command could not be started
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
/// Exit status when the interpreter or tool script is missing
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status for configuration faults (sysexits EX_CONFIG)
pub const EXIT_CONFIG: i32 = 78;

/// Errors raised while building the alias table, resolving, or invoking
#[derive(Error, Debug)]
pub enum Error {
    #[error("alias already registered: {0}")]
    DuplicateAlias(String),

    #[error("unknown alias: {0}")]
    UnknownAlias(String),

    #[error("invalid alias: {0}")]
    InvalidAlias(String),

    #[error("{0} requires an ID argument")]
    MissingId(String),

    #[error("executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool exited with status {exit_code}")]
    ExternalTool { exit_code: i32 },

    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Process exit status to report for this error.
    ///
    /// `ExternalTool` relays the child's own status unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalTool { exit_code } => *exit_code,
            Self::UnknownAlias(_) | Self::MissingId(_) => EXIT_USAGE,
            Self::ExecutableNotFound(_) => EXIT_NOT_FOUND,
            Self::Spawn { .. } => EXIT_CANNOT_EXECUTE,
            Self::DuplicateAlias(_) | Self::InvalidAlias(_) | Self::Config { .. } => EXIT_CONFIG,
        }
    }

    /// True for errors caused by how the command was typed
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::UnknownAlias(_) | Self::MissingId(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
