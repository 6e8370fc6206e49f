// Metrics hooks for the matcher crate.
//
// Callers install a global `MatchMetrics` implementation via
// [`set_match_metrics`]; `MatchEngine` then reports per-call latency,
// candidate counts, and the decision for every identify. This keeps
// instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for identify operations.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one identify call.
    ///
    /// `latency` is wall-clock time including any lazy refresh,
    /// `candidates` is the number of enrolled identities scanned, `score`
    /// is the best similarity observed, and `accepted` the threshold
    /// decision.
    fn record_identify(&self, latency: Duration, candidates: usize, score: f32, accepted: bool);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// Typically called once during service startup so every `MatchEngine`
/// shares the same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("match metrics lock poisoned");
    *guard = recorder;
}
