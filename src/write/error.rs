/// Errors that can occur in the write layer.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// I/O error during container or sink operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    Zip(#[from] ::zip::result::ZipError),

    /// A sink was opened against a container that was never prepared
    #[error("container not prepared: {0}")]
    NotPrepared(String),

    /// A write was attempted after the container was sealed
    #[error("container already finalized: {0}")]
    AlreadyFinalized(String),

    /// The shared archive handle was poisoned by a panicking writer
    #[error("archive handle poisoned")]
    Poisoned,
}
