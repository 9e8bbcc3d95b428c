use std::sync::Arc;

/// The result of calling one of the gateway's backing services.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors returned by the gateway's backing services: the result store, the
/// account-sequence lookup, the envelope parser, and the relay client.
///
/// Cloneable so a single failure can be fanned out to every caller waiting
/// on the same submission; I/O sources are held behind an `Arc` for that
/// reason.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ProviderError {
    /// The raw payload could not be decoded as a transaction envelope.
    #[error("malformed transaction envelope: {0}")]
    MalformedEnvelope(String),
    /// The service answered, but outside its protocol.
    #[error("provider request failed: {0}")]
    Request(String),
    /// The service could not be reached.
    #[error("i/o failure talking to a provider")]
    Io(#[source] Arc<std::io::Error>),
    /// The service did not answer within its own deadline.
    #[error("provider request timed out")]
    Timeout,
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
