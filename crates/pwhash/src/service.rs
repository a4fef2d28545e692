//! Intake orchestration.
//!
//! [`HashService`] is the single entry point an intake path needs. It owns
//! every piece of shared state and enforces the one ordering the shutdown
//! guarantee depends on: a submission is registered with the
//! [`TaskTracker`] strictly before its computation is spawned.

use crate::{
    DEFAULT_HASH_DELAY, DigestComputation, DigestStore, Digester, Error, Identifier,
    IdentifierAllocator, RequestStats, Result, Sha512Digester, ShutdownCoordinator, ShutdownState,
    TaskTracker,
};
use core::time::Duration;
use std::sync::Arc;

/// Tunables for a [`HashService`].
#[derive(Clone, Debug)]
pub struct HashServiceConfig {
    /// How long each computation waits before digesting.
    pub hash_delay: Duration,
    /// Refuse new submissions once shutdown has been triggered. Off by
    /// default: submissions keep being accepted, tracked, and drained.
    pub reject_during_drain: bool,
    /// Upper bound on the shutdown drain. `None` waits unconditionally.
    pub drain_timeout: Option<Duration>,
}

impl Default for HashServiceConfig {
    fn default() -> Self {
        Self {
            hash_delay: DEFAULT_HASH_DELAY,
            reject_during_drain: false,
            drain_timeout: None,
        }
    }
}

/// Accepts secrets, issues identifiers, and schedules delayed digests.
///
/// Cloning is cheap; all clones share the same allocator, store, tracker,
/// stats, and shutdown coordinator.
pub struct HashService<D: Digester = Sha512Digester> {
    config: HashServiceConfig,
    allocator: Arc<IdentifierAllocator>,
    store: Arc<DigestStore>,
    tracker: TaskTracker,
    digester: Arc<D>,
    coordinator: Arc<ShutdownCoordinator>,
    stats: Arc<RequestStats>,
}

impl HashService<Sha512Digester> {
    /// Creates a service that digests with SHA-512.
    pub fn new(config: HashServiceConfig) -> Self {
        Self::with_digester(config, Sha512Digester)
    }
}

impl<D: Digester> HashService<D> {
    pub fn with_digester(config: HashServiceConfig, digester: D) -> Self {
        let tracker = TaskTracker::new();
        let coordinator = ShutdownCoordinator::new(tracker.clone(), config.drain_timeout);
        Self {
            config,
            allocator: Arc::new(IdentifierAllocator::new()),
            store: Arc::new(DigestStore::new()),
            tracker,
            digester: Arc::new(digester),
            coordinator: Arc::new(coordinator),
            stats: Arc::new(RequestStats::new()),
        }
    }

    /// Accepts `secret`, returning its identifier immediately.
    ///
    /// The digest becomes visible through [`Self::lookup`] once the
    /// configured delay has elapsed and the computation has finished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once the coordinator has reached
    /// [`ShutdownState::Stopped`], or as soon as shutdown has been triggered
    /// if `reject_during_drain` is set. No identifier is allocated in either
    /// case.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn submit(&self, secret: impl Into<String>) -> Result<Identifier> {
        match self.coordinator.state() {
            ShutdownState::Running => {}
            ShutdownState::Draining if !self.config.reject_during_drain => {}
            // Nothing waits for work registered after the drain completed.
            ShutdownState::Draining | ShutdownState::Stopped => {
                return Err(Error::ServiceShutdown);
            }
        }

        let id = self.allocator.next();
        // Registration happens here, before the spawn, so a drain started the
        // moment this returns still sees the computation.
        let guard = self.tracker.register();
        let computation = DigestComputation::new(id, secret, self.config.hash_delay);
        let store = Arc::clone(&self.store);
        let digester = Arc::clone(&self.digester);

        tokio::spawn(async move {
            if let Err(_e) = computation.run(store, digester, guard).await {
                #[cfg(feature = "tracing")]
                tracing::error!(%id, "Digest computation failed: {_e}");
            }
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, "Submission accepted");
        Ok(id)
    }

    /// Returns the digest for `id` if its computation has completed.
    pub fn lookup(&self, id: Identifier) -> Option<String> {
        self.store.get(id)
    }

    /// Number of computations spawned but not yet finished.
    pub fn outstanding(&self) -> usize {
        self.tracker.outstanding()
    }

    /// Waits for every computation registered so far to finish.
    ///
    /// Used after the transport has closed to pick up submissions that
    /// raced the coordinator's drain.
    pub async fn await_outstanding(&self) {
        self.tracker.await_drain().await;
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> u64 {
        self.allocator.issued()
    }

    pub fn stats(&self) -> &Arc<RequestStats> {
        &self.stats
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }

    pub const fn config(&self) -> &HashServiceConfig {
        &self.config
    }
}

impl<D: Digester> Clone for HashService<D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            allocator: Arc::clone(&self.allocator),
            store: Arc::clone(&self.store),
            tracker: self.tracker.clone(),
            digester: Arc::clone(&self.digester),
            coordinator: Arc::clone(&self.coordinator),
            stats: Arc::clone(&self.stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tokio::time::{Instant, sleep};

    const ANGRY_MONKEY: &str =
        "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

    fn fast_config() -> HashServiceConfig {
        HashServiceConfig {
            hash_delay: Duration::from_millis(10),
            ..HashServiceConfig::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_submissions_get_unique_sequential_ids() {
        const N: u64 = 512;
        let service = HashService::new(fast_config());

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.submit(format!("secret-{i}")).unwrap() })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap().to_raw()));
        }
        assert_eq!(ids, (1..=N).collect::<HashSet<_>>());
        assert_eq!(service.issued(), N);

        service.coordinator().trigger();
        service.coordinator().run().await.unwrap();
        assert_eq!(service.outstanding(), 0);
        for raw in 1..=N {
            assert!(service.lookup(Identifier::from_raw(raw)).is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn digest_is_pending_until_delay_elapses() {
        let service = HashService::new(HashServiceConfig::default());
        let id = service.submit("angryMonkey").unwrap();

        assert_eq!(id, Identifier::from_raw(1));
        assert_eq!(service.lookup(id), None);
        assert_eq!(service.outstanding(), 1);

        sleep(Duration::from_secs(4)).await;
        assert_eq!(service.lookup(id), None);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(service.lookup(id).as_deref(), Some(ANGRY_MONKEY));
        assert_eq!(service.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_are_idempotent_and_digests_deterministic() {
        let service = HashService::new(HashServiceConfig::default());
        let first = service.submit("angryMonkey").unwrap();
        let second = service.submit("angryMonkey").unwrap();
        let other = service.submit("calmMonkey").unwrap();
        assert_ne!(first, second);

        sleep(DEFAULT_HASH_DELAY + Duration::from_millis(1)).await;

        let digest = service.lookup(first).unwrap();
        for _ in 0..5 {
            assert_eq!(service.lookup(first).as_deref(), Some(digest.as_str()));
        }
        assert_eq!(service.lookup(second), Some(digest.clone()));
        assert_ne!(service.lookup(other), Some(digest));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_id_is_absent() {
        let service = HashService::new(HashServiceConfig::default());
        assert_eq!(service.lookup(Identifier::from_raw(99)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_in_flight_digest() {
        let service = HashService::new(HashServiceConfig::default());
        let id = service.submit("angryMonkey").unwrap();

        let start = Instant::now();
        assert!(service.coordinator().trigger());
        service.coordinator().run().await.unwrap();

        assert!(start.elapsed() >= DEFAULT_HASH_DELAY);
        assert_eq!(service.coordinator().state(), ShutdownState::Stopped);
        assert_eq!(service.lookup(id).as_deref(), Some(ANGRY_MONKEY));
    }

    #[tokio::test(start_paused = true)]
    async fn submissions_during_drain_are_accepted_and_drained() {
        let service = HashService::new(HashServiceConfig::default());
        let first = service.submit("one").unwrap();

        let runner = {
            let service = service.clone();
            tokio::spawn(async move { service.coordinator().run().await })
        };
        service.coordinator().trigger();
        sleep(Duration::from_secs(3)).await;

        let late = service.submit("two").unwrap();
        assert_eq!(late, Identifier::from_raw(2));

        runner.await.unwrap().unwrap();
        assert!(service.lookup(first).is_some());
        assert!(service.lookup(late).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn submissions_after_stop_are_refused() {
        let service = HashService::new(HashServiceConfig::default());
        service.coordinator().trigger();
        service.coordinator().run().await.unwrap();
        assert_eq!(service.coordinator().state(), ShutdownState::Stopped);

        assert_eq!(service.submit("late"), Err(Error::ServiceShutdown));
        assert_eq!(service.issued(), 0);
        assert_eq!(service.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn await_outstanding_picks_up_work_registered_after_drain() {
        let service = HashService::new(HashServiceConfig::default());
        service.coordinator().trigger();
        service.coordinator().run().await.unwrap();

        // Registered after the tracker drained, while the state flip raced.
        let guard = service.tracker.register();
        tokio::spawn(async move {
            sleep(Duration::from_secs(2)).await;
            guard.complete();
        });

        let start = Instant::now();
        service.await_outstanding().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(service.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_during_drain_when_configured() {
        let service = HashService::new(HashServiceConfig {
            reject_during_drain: true,
            ..HashServiceConfig::default()
        });
        service.submit("before").unwrap();
        service.coordinator().trigger();

        assert_eq!(service.submit("after"), Err(Error::ServiceShutdown));
        assert_eq!(service.issued(), 1);
        assert_eq!(service.outstanding(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_digester_never_blocks_shutdown() {
        struct Broken;
        impl Digester for Broken {
            fn digest(&self, _secret: &[u8]) -> Result<String> {
                Err(Error::Digest {
                    reason: "boom".to_string(),
                })
            }
        }

        let service = HashService::with_digester(HashServiceConfig::default(), Broken);
        let id = service.submit("secret").unwrap();

        service.coordinator().trigger();
        service.coordinator().run().await.unwrap();
        assert_eq!(service.lookup(id), None);
        assert_eq!(service.outstanding(), 0);
    }
}
