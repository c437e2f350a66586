use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("No element matches: {0}")]
    ElementNotFound(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Permission request failed: {0}")]
    PermissionRequest(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
