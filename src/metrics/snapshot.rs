/// Point-in-time copy of an LFU cache's counters plus size gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LfuMetricsSnapshot {
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

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LfuMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before the first call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }

    /// Sums counters and gauges of two shards.
    pub fn merge(self, other: Self) -> Self {
        Self {
            get_calls: self.get_calls + other.get_calls,
            get_hits: self.get_hits + other.get_hits,
            get_misses: self.get_misses + other.get_misses,
            put_calls: self.put_calls + other.put_calls,
            put_new: self.put_new + other.put_new,
            put_updates: self.put_updates + other.put_updates,
            put_rejected: self.put_rejected + other.put_rejected,
            evicted_entries: self.evicted_entries + other.evicted_entries,
            remove_calls: self.remove_calls + other.remove_calls,
            remove_hits: self.remove_hits + other.remove_hits,
            clear_calls: self.clear_calls + other.clear_calls,
            cache_len: self.cache_len + other.cache_len,
            capacity: self.capacity + other.capacity,
        }
    }
}
