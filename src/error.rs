use thiserror::Error;

use crate::api::ApiError;
use crate::wizard::WizardError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, AppError>;
