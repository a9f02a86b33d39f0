use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Invalid engine parameter: {0}")]
    InvalidParameter(String),
}
