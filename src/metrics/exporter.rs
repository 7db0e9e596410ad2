use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::LfuMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for LFU cache snapshots.
///
/// Writes the text exposition format with a `cache` label so the three
/// entity caches can share one sink:
///
/// ```text
/// # TYPE expensekit_get_hits_total counter
/// expensekit_get_hits_total{cache="categories"} 42
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    label: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            label: String::new(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns an exporter that tags every sample with `cache="<name>"`.
    pub fn with_cache_label(mut self, name: impl Into<String>) -> Self {
        self.label = name.into();
        self
    }

    /// Changes the `cache` label for subsequent exports.
    pub fn set_cache_label(&mut self, name: impl Into<String>) {
        self.label = name.into();
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        if self.label.is_empty() {
            let _ = writeln!(writer, "{} {}", name, value);
        } else {
            let _ = writeln!(writer, "{}{{cache=\"{}\"}} {}", name, self.label, value);
        }
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<LfuMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &LfuMetricsSnapshot) {
        let counters = [
            ("get_calls_total", snapshot.get_calls),
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("put_calls_total", snapshot.put_calls),
            ("put_new_total", snapshot.put_new),
            ("put_updates_total", snapshot.put_updates),
            ("put_rejected_total", snapshot.put_rejected),
            ("evicted_entries_total", snapshot.evicted_entries),
            ("remove_calls_total", snapshot.remove_calls),
            ("remove_hits_total", snapshot.remove_hits),
            ("clear_calls_total", snapshot.clear_calls),
        ];
        for (suffix, value) in counters {
            self.write_sample("counter", suffix, value);
        }
        self.write_sample("gauge", "cache_len", snapshot.cache_len as u64);
        self.write_sample("gauge", "capacity", snapshot.capacity as u64);
    }
}
