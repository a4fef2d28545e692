use crate::Identifier;
use parking_lot::RwLock;
use std::collections::{HashMap, hash_map::Entry};

/// Concurrent mapping from [`Identifier`] to its encoded digest.
///
/// Each identifier is written by exactly one computation task. The store
/// keeps the first digest written for an id and refuses later writes, so a
/// reader either sees nothing or the final value, never a replacement.
#[derive(Debug, Default)]
pub struct DigestStore {
    digests: RwLock<HashMap<Identifier, String>>,
}

impl DigestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `digest` for `id`.
    ///
    /// Returns `false` if a digest was already present; the existing value
    /// is left untouched. A second write means two tasks were handed the
    /// same identifier, which the allocator rules out.
    pub fn put(&self, id: Identifier, digest: String) -> bool {
        match self.digests.write().entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(digest);
                true
            }
            Entry::Occupied(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%id, "Ignoring second digest write");
                false
            }
        }
    }

    /// Returns the digest for `id`, or `None` if it is still pending or was
    /// never issued.
    pub fn get(&self, id: Identifier) -> Option<String> {
        self.digests.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.digests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.read().is_empty()
    }
}
