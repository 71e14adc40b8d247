/// Core error type for the watcher.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can apply one policy per failure class: fatal at startup, reported per
/// cycle, or logged-only delivery loss.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing or unusable. Fatal before the loop starts.
    #[error("config error: {0}")]
    Config(String),

    /// The status API could not be reached or answered with a non-success code.
    #[error("api error: {0}")]
    Api(String),

    /// The API answered, but the payload does not match the documented shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A required key is absent from the payload.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A homework status outside the known verdict set.
    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    /// Message delivery failed. Logged by the caller, never escalated.
    #[error("notify error: {0}")]
    Notify(String),
}

impl Error {
    /// Failures the poll loop reports and survives. Only `Config` stops the process.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
