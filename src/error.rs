use thiserror::Error;

use crate::remote::RemoteError;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal or local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid value supplied on the command line or in a config file.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A view record or node handle that no longer resolves to a live node.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// Remote document store or document id cache failure.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}
