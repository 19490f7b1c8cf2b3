use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Business(#[from] geobatch_core::usecases::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("Invalid coordinate '{value}' in column '{column}' of record {key}")]
    InvalidCoordinate {
        key: String,
        column: String,
        value: String,
    },
}
