use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FarmError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no metrics available: no jobs have been handled")]
    NoMetricsAvailable,

    #[error("time cannot move backwards: clock is at {current}, requested {requested}")]
    NonMonotonicTime { current: f64, requested: f64 },

    #[error("invalid job {id}: {reason}")]
    InvalidJob { id: u64, reason: String },

    #[error("unknown dispatch policy `{0}`")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, FarmError>;
