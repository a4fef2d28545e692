use core::{fmt, num::ParseIntError, str::FromStr};
use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Handle assigned to an accepted submission.
///
/// Identifiers start at 1 and are issued in strictly increasing order of
/// allocation. They say nothing about the order in which digests complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Identifier(u64);

impl Identifier {
    /// Wraps a raw value. Used when an id arrives from outside (e.g. a path
    /// segment); it may or may not have been issued.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// A lock-free allocator of sequential [`Identifier`]s.
///
/// Every call to [`Self::next`] performs exactly one atomic increment, so
/// concurrent callers never observe the same value and no value is skipped.
///
/// ## Features
///
/// - ✅ Thread-safe
/// - ✅ Gap-free: `n` calls issue exactly `1..=n`
/// - ❌ Survives restarts
#[derive(Debug)]
pub struct IdentifierAllocator {
    next: AtomicU64,
}

impl IdentifierAllocator {
    /// Creates an allocator whose first issued identifier is `1`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issues the next identifier.
    ///
    /// # Example
    /// ```
    /// use pwhash::IdentifierAllocator;
    ///
    /// let allocator = IdentifierAllocator::new();
    /// assert_eq!(allocator.next().to_raw(), 1);
    /// assert_eq!(allocator.next().to_raw(), 2);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next(&self) -> Identifier {
        Identifier(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new()
    }
}
