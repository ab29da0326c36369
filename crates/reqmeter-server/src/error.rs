//! Startup/runtime errors of the server binary.

use thiserror::Error;

use reqmeter_core::MeterError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Meter(#[from] MeterError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
