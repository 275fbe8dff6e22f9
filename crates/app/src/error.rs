//! Error types for the command-line front end

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] classmatch_core::Error),

    #[error(transparent)]
    Api(#[from] classmatch_api::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
