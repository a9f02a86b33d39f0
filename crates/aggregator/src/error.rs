use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Invalid analysis window: {0}")]
    InvalidWindow(String),

    #[error("Metrics engine error: {0}")]
    Metrics(#[from] trade_metrics::MetricsError),

    #[error("Invalid input: {0}")]
    Core(#[from] core_types::CoreError),
}
