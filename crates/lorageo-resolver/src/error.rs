use thiserror::Error;

/// Failure modes of the geolocation resolver client.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver answered but could not compute a fix. A sentinel, not a
    /// transport failure; callers treat it as "no location".
    #[error("no location returned by the resolver")]
    NoLocation,

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The resolver base URI could not be parsed or joined.
    #[error("invalid resolver uri: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// The configured token cannot be carried as a header value.
    #[error("invalid geolocation token: {0}")]
    InvalidToken(String),

    /// Non-2xx response from the resolver.
    #[error("resolver api error (http {status}): {body}")]
    Api { status: u16, body: String },

    /// Response body did not parse, with the raw body for debugging.
    #[error("resolver response error: {message}")]
    Deserialization { message: String, body: String },

    /// The response parsed but violated the documented shape.
    #[error("unexpected resolver response: {0}")]
    Response(String),
}

impl ResolverError {
    pub fn is_no_location(&self) -> bool {
        matches!(self, Self::NoLocation)
    }
}
