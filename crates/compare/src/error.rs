use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (inverted range, negative tolerance, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// CSV serialization of the change log failed.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
