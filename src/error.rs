//! Application error type.
//!
//! Every failure is fatal to the run: `main` prints the message and exits with
//! [`AppError::exit_code`].

use std::path::PathBuf;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    /// Input file missing, unreadable, malformed, or empty.
    #[error("Failed to load '{path}': {message}")]
    DataLoad { path: PathBuf, message: String },

    /// An expected column is absent from the table.
    #[error("Missing required column: `{column}`")]
    ColumnNotFound { column: String },

    /// Bad CLI/config value.
    #[error("{0}")]
    InvalidInput(String),

    /// Writing an export file failed.
    #[error("Failed to write '{path}': {message}")]
    Export { path: PathBuf, message: String },

    /// Terminal setup or drawing failed.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    pub fn export(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Export {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::DataLoad { .. } | AppError::ColumnNotFound { .. } | AppError::InvalidInput(_) => 2,
            AppError::Export { .. } => 3,
            AppError::Terminal(_) => 4,
        }
    }
}
