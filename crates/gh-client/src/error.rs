//! Transport error classification

use thiserror::Error;

/// Failures that are expected to clear up on their own
///
/// Anything wrapped in this type may be retried by long-running callers.
/// Every other error returned by a client is considered permanent.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never got an answer (DNS, TCP, TLS, timeouts)
    #[error("Connection to GitHub failed: {0}")]
    Connection(String),

    /// GitHub answered with a 5xx status
    #[error("GitHub answered {status} for {route}")]
    Server { status: u16, route: String },
}

/// Whether an error (or anything in its cause chain) is a [`TransportError`]
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<TransportError>().is_some())
}
