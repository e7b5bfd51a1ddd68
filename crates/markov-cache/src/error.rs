/// Errors returned by markov-cache-rs operations.
///
/// Caller bugs (double registration of a key, GET of an unregistered key,
/// out-of-range state indices, zero or oversized item sizes) are treated as
/// fatal assertions rather than recoverable errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A configuration value failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A trace file could not be parsed.
    #[error("trace error at line {line}: {message}")]
    TraceError {
        /// 1-based line number where the error occurred.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
