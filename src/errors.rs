use thiserror::Error;

/// Fatal failure modes of an evaluation run. Anything here aborts the run
/// with no partial metrics reported.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Dimension mismatch or out-of-range user/item ids in the input data.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// The external scoring model returned malformed output.
    #[error("scoring failure: {0}")]
    Scoring(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
