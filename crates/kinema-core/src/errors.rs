use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdaptError {
    /// A resource was registered with conflicting parameters
    /// (e.g. re-mapped to a different adaptation reason).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Lookup for a resource that was never registered. Callers must
    /// only query reasons for resources they have mapped.
    #[error("not found: {0}")]
    NotFound(String),
}

pub type AdaptResult<T> = Result<T, AdaptError>;
