use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Invalid incident report: {0}")]
    Decode(String),
    #[error("No Incident-Report-Number header provided.")]
    MissingNumberHeader,
    #[error("Non-integer Incident-Report-Number header provided: {0}")]
    InvalidNumberHeader(String),
    #[error("Incident report failed to load")]
    NotLoaded,
}

pub type Result<T> = std::result::Result<T, ReportError>;
