use mines3d_core::GameError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid date {date:?} in score record: {source}")]
    Date {
        date: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("Could not format score date: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("Invalid score record: {0}")]
    Record(#[from] GameError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
