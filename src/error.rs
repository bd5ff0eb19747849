//! Error types for the transaction dashboard

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No wallet provider available: {0}")]
    ProviderMissing(String),

    #[error("Account access rejected: {0}")]
    UserRejected(String),

    #[error("Contract unavailable: {0}")]
    ContractUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("A submission is already pending for this session")]
    SubmissionPending,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
