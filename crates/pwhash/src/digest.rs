//! The delayed digest computation and the hash it applies.
//!
//! ## Structure
//!
//! - [`Digester`] - one-way transformation of secret bytes into printable
//!   text.
//! - [`Sha512Digester`] - SHA-512, standard padded base-64 (88 characters).
//! - [`DigestComputation`] - one submission's unit of work: wait, digest,
//!   store, deregister.

use crate::{DigestStore, Identifier, Result, TaskGuard};
use base64::{Engine, engine::general_purpose::STANDARD};
use core::{fmt, time::Duration};
use sha2::{Digest as _, Sha512};
use std::sync::Arc;
use tokio::time::sleep;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Delay applied before each digest is computed, unless configured otherwise.
pub const DEFAULT_HASH_DELAY: Duration = Duration::from_secs(5);

/// A deterministic one-way hash producing a fixed-size, text-encoded output.
///
/// Implementations must be deterministic for identical input bytes. The
/// encoding must be reversible to the raw digest bytes.
pub trait Digester: Send + Sync + 'static {
    /// Digests `secret` and encodes the result as text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Digest`] if hashing or encoding fails. The
    /// failure is local to the computation that hit it.
    fn digest(&self, secret: &[u8]) -> Result<String>;
}

/// SHA-512 encoded with the standard base-64 alphabet and padding.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha512Digester;

impl Digester for Sha512Digester {
    fn digest(&self, secret: &[u8]) -> Result<String> {
        Ok(STANDARD.encode(Sha512::digest(secret)))
    }
}

/// A pending submission: the identifier it was issued and the raw secret.
///
/// Consumed exactly once by [`Self::run`].
pub struct DigestComputation {
    id: Identifier,
    secret: String,
    delay: Duration,
}

impl DigestComputation {
    pub fn new(id: Identifier, secret: impl Into<String>, delay: Duration) -> Self {
        Self {
            id,
            secret: secret.into(),
            delay,
        }
    }

    pub const fn id(&self) -> Identifier {
        self.id
    }

    /// Waits for the configured delay, digests the secret, and stores the
    /// result under this computation's identifier.
    ///
    /// `guard` is held for the whole computation and released on every exit
    /// path, including a digester error or a panic.
    ///
    /// # Errors
    ///
    /// Propagates the digester's error. Nothing is stored in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(id = %self.id())))]
    pub async fn run<D: Digester>(
        self,
        store: Arc<DigestStore>,
        digester: Arc<D>,
        guard: TaskGuard,
    ) -> Result<()> {
        let _guard = guard;

        sleep(self.delay).await;

        let digest = digester.digest(self.secret.as_bytes())?;
        store.put(self.id, digest);

        #[cfg(feature = "tracing")]
        tracing::debug!("Digest stored");
        Ok(())
    }
}

impl fmt::Debug for DigestComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestComputation")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("delay", &self.delay)
            .finish()
    }
}
