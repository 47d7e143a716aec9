//! Metrics collection for `--stats`.
//!
//! Passes report through metrics-rs. The recorder here keeps only counters,
//! one atomic cell per key, so they can be printed once the run is over.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use parking_lot::RwLock;

type CounterCells = Arc<RwLock<BTreeMap<String, Arc<AtomicU64>>>>;

/// Recorder that keeps counters for the end-of-run summary.
///
/// Gauges and histograms are dropped; no pass emits them.
#[derive(Default)]
pub struct StatsRecorder {
    cells: CounterCells,
}

impl StatsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this recorder as the global metrics recorder.
    ///
    /// Returns `None` if a recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<StatsHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    fn handle(&self) -> StatsHandle {
        StatsHandle {
            cells: Arc::clone(&self.cells),
        }
    }

    fn cell(&self, key: &Key) -> Arc<AtomicU64> {
        let name = counter_name(key);
        if let Some(cell) = self.cells.read().get(&name) {
            return Arc::clone(cell);
        }
        Arc::clone(self.cells.write().entry(name).or_default())
    }
}

/// `name` or `name{label=value,...}`.
fn counter_name(key: &Key) -> String {
    let mut labels = key.labels().peekable();
    if labels.peek().is_none() {
        return key.name().to_string();
    }
    let labels: Vec<_> = labels.map(|l| format!("{}={}", l.key(), l.value())).collect();
    format!("{}{{{}}}", key.name(), labels.join(","))
}

impl Recorder for StatsRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.cell(key))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Reads counters back after the recorder is installed.
pub struct StatsHandle {
    cells: CounterCells,
}

impl StatsHandle {
    /// Current value of a counter.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.cells
            .read()
            .get(name)
            .map(|cell| cell.load(Ordering::Relaxed))
    }

    /// Counter lines in key order.
    #[must_use]
    pub fn summary(&self) -> String {
        let cells = self.cells.read();
        if cells.is_empty() {
            return "No metrics collected.\n".to_string();
        }
        let mut out = String::from("## Metrics Summary\n");
        for (name, cell) in cells.iter() {
            out.push_str(&format!("  {name}: {}\n", cell.load(Ordering::Relaxed)));
        }
        out
    }

    /// Print the summary to stderr; stdout may carry the module.
    pub fn print_summary(&self) {
        eprint!("{}", self.summary());
    }
}
