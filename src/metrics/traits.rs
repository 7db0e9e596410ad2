//! Recording, snapshotting and export are separate traits so cache code only
//! ever writes counters and monitoring code only ever reads them.

/// Counters every LFU cache records.
pub trait LfuMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_put_new(&mut self);
    fn record_put_update(&mut self);
    fn record_put_rejected(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_remove_hit(&mut self);
    fn record_remove_miss(&mut self);
    fn record_clear(&mut self);
}

/// Produces a point-in-time copy of a cache's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes a snapshot to a monitoring sink.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
