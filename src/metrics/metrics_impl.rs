use crate::metrics::traits::LfuMetricsRecorder;

/// Raw counters owned by one [`LfuCache`](crate::policy::lfu::LfuCache).
///
/// Mutated only through `&mut` cache methods, so plain integers suffice; the
/// sharded wrapper already serializes access per shard.
#[derive(Debug, Default, Clone)]
pub struct LfuMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub put_calls: u64,
    pub put_new: u64,
    pub put_updates: u64,
    pub put_rejected: u64,
    pub evicted_entries: u64,
    pub remove_calls: u64,
    pub remove_hits: u64,
    pub clear_calls: u64,
}

impl LfuMetricsRecorder for LfuMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_put_new(&mut self) {
        self.put_calls += 1;
        self.put_new += 1;
    }

    fn record_put_update(&mut self) {
        self.put_calls += 1;
        self.put_updates += 1;
    }

    // capacity 0
    fn record_put_rejected(&mut self) {
        self.put_calls += 1;
        self.put_rejected += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_remove_hit(&mut self) {
        self.remove_calls += 1;
        self.remove_hits += 1;
    }

    fn record_remove_miss(&mut self) {
        self.remove_calls += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_updates_call_totals() {
        let mut m = LfuMetrics::default();
        m.record_get_hit();
        m.record_get_miss();
        m.record_get_miss();
        m.record_put_new();
        m.record_put_update();
        m.record_put_rejected();
        m.record_remove_hit();
        m.record_remove_miss();

        assert_eq!((m.get_calls, m.get_hits, m.get_misses), (3, 1, 2));
        assert_eq!((m.put_calls, m.put_new, m.put_updates, m.put_rejected), (3, 1, 1, 1));
        assert_eq!((m.remove_calls, m.remove_hits), (2, 1));
    }
}
