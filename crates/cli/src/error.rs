use engine_core::error::{ListError, SettingsError};
use model::pagination::cursor::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the settings file: {0}")]
    SettingsRead(#[from] std::io::Error),

    #[error("Invalid pagination settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to plan the page query: {0}")]
    Plan(#[from] ListError),

    #[error("Cursor token is not valid base64: {0}")]
    Token(#[from] base64::DecodeError),

    #[error("Invalid cursor: {0}")]
    Cursor(#[from] CursorError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("One of --int, --text or --timestamp is required")]
    MissingSortValue,
}
