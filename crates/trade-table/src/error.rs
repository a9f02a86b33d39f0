use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to open trade data: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing from the trade data header")]
    MissingColumn(&'static str),

    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("Negative trade value recorded for {year}")]
    NegativeValue { year: i32 },

    #[error("Trade values recorded for {year} sum beyond the representable range")]
    ValueOverflow { year: i32 },

    #[error("Invalid subject country: {0}")]
    InvalidSubject(#[from] core_types::CoreError),
}
