use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("frame buffer store error: {0}")]
    BufferStore(#[source] anyhow::Error),

    #[error("geolocation resolver error: {0}")]
    Resolver(#[source] anyhow::Error),

    #[error("location event sink error: {0}")]
    Sink(#[source] anyhow::Error),

    #[error("operation canceled")]
    Canceled,
}

pub type DomainResult<T> = Result<T, DomainError>;
