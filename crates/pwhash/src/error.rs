//! Error types for the digest service core.
//!
//! ## Error Cases
//! - `Digest`: hashing or encoding a secret failed inside a computation task.
//! - `ServiceShutdown`: intake was refused because the service is draining.
//! - `DrainTimeout`: a bounded drain gave up with work still outstanding.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the digest service core.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The digester failed to produce a digest.
    #[error("Digest error: {reason}")]
    Digest { reason: String },

    /// The service is draining and refuses new submissions.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// The drain wait elapsed before every outstanding task completed.
    #[error("Drain timed out with {outstanding} task(s) outstanding")]
    DrainTimeout { outstanding: usize },
}
