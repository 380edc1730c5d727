//! Error taxonomy shared by every pass.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures a pass can report for a single file or command.
///
/// Passes log these and move on to the next file; only the deploy pass treats a failed
/// external command as fatal.
#[derive(Debug, Error)]
pub enum PrepError {
    /// The input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading, writing or moving a file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The image could not be decoded.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Image path.
        path: PathBuf,
        /// Source decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image could not be encoded or written.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Output path.
        path: PathBuf,
        /// Source encoder error.
        #[source]
        source: image::ImageError,
    },

    /// An external command could not be spawned or exited unsuccessfully.
    #[error("`{command}` failed: {reason}")]
    Command {
        /// Command line as typed.
        command: String,
        /// Exit status or spawn error.
        reason: String,
    },

    /// An explicitly requested configuration file could not be loaded.
    #[error("invalid configuration {}: {reason}", path.display())]
    Config {
        /// Configuration file path.
        path: PathBuf,
        /// Parse or read failure.
        reason: String,
    },
}

impl PrepError {
    /// Wrap an I/O error, mapping `NotFound` onto [`PrepError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Build a command failure from a finished process status.
    pub fn command_status(command: impl Into<String>, status: ExitStatus) -> Self {
        Self::Command {
            command: command.into(),
            reason: format!("exited with {status}"),
        }
    }
}
