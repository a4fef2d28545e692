use parking_lot::Mutex;

/// Point-in-time view of [`RequestStats`].
///
/// Serializes with the field names clients already expect:
/// `{"total": <count>, "average": <milliseconds>}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub average: f64,
}

#[derive(Debug, Default)]
struct Totals {
    count: u64,
    total_ms: f64,
    average: f64,
}

/// Request counter with a running average latency.
///
/// Each [`Self::record`] updates count, accumulated time, and average under
/// a single lock, and the average is always recomputed from the totals.
#[derive(Debug, Default)]
pub struct RequestStats {
    totals: Mutex<Totals>,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed request that took `duration_ms` milliseconds.
    pub fn record(&self, duration_ms: f64) {
        let mut totals = self.totals.lock();
        totals.count += 1;
        totals.total_ms += duration_ms;
        totals.average = totals.total_ms / totals.count as f64;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let totals = self.totals.lock();
        StatsSnapshot {
            total: totals.count,
            average: totals.average,
        }
    }
}
