use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database dump failed: {0}")]
    Dump(String),

    #[error("Database import failed: {0}")]
    Import(String),

    #[error("Archive creation failed: {0}")]
    Pack(String),

    #[error("Archive extraction failed: {0}")]
    Unpack(String),

    #[error("Remote storage error: {0}")]
    Remote(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remote(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
