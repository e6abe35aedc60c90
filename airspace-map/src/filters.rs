//! Temporal filters for the TFR sublayers.
//!
//! Temporary flight restrictions are split across two layers by their date
//! window: `active-tfrs` for restrictions in effect now and `future-tfrs` for
//! upcoming ones. Both layers carry a feature filter comparing the
//! `date_effective` / `date_expire` properties (epoch milliseconds) against
//! wall-clock time, so the filters go stale and must be recomputed
//! periodically. [`FilterUpdater`] owns that periodic task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::layers::{ACTIVE_TFRS, FUTURE_TFRS};
use crate::renderer::MapRenderer;

/// How often the temporal filters are recomputed by default.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Filter selecting restrictions in effect at `now`.
///
/// A feature matches when it became effective and either has not expired yet
/// or carries no expiry at all.
pub fn active_tfr_filter(now: i64) -> Value {
    json!([
        "any",
        ["all", ["<=", "date_effective", now], [">=", "date_expire", now]],
        ["all", ["<=", "date_effective", now], ["!has", "date_expire"]]
    ])
}

/// Filter selecting restrictions that only become effective at or after `now`.
pub fn future_tfr_filter(now: i64) -> Value {
    json!([">=", "date_effective", now])
}

/// Whether a feature with the given dates is selected by the active filter.
pub fn matches_active(date_effective: i64, date_expire: Option<i64>, now: i64) -> bool {
    date_effective <= now && date_expire.map_or(true, |expire| expire >= now)
}

/// Whether a feature with the given effective date is selected by the future
/// filter.
pub fn matches_future(date_effective: i64, now: i64) -> bool {
    date_effective >= now
}

/// Periodic task keeping both TFR filters current.
///
/// Applies the filters immediately on spawn and again every `interval`. The
/// task stops when [`cancel`](FilterUpdater::cancel) is called or the updater
/// is dropped, so a torn-down facade cannot leak a ticking task.
pub struct FilterUpdater {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl FilterUpdater {
    /// Spawns the update task. At most one updater should exist per facade;
    /// spawning a replacement cancels nothing by itself, so callers cancel
    /// the previous updater first (dropping it is enough).
    pub fn spawn(renderer: Arc<dyn MapRenderer>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("temporal filter updater cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let now = Utc::now().timestamp_millis();
                        renderer.set_filter(ACTIVE_TFRS, active_tfr_filter(now));
                        renderer.set_filter(FUTURE_TFRS, future_tfr_filter(now));
                        debug!(now, "temporal TFR filters recomputed");
                    }
                }
            }
        });

        Self { token, handle }
    }

    /// Stops the periodic task.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the task has finished (always true shortly after cancel).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FilterUpdater {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::tests::MockRenderer;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_active_filter_selects_current_window() {
        assert!(matches_active(T - 1, Some(T + 1), T));
        assert!(!matches_active(T + 1, Some(T + 2), T));
        assert!(!matches_active(T - 2, Some(T - 1), T));
    }

    #[test]
    fn test_active_filter_selects_open_ended_restrictions() {
        assert!(matches_active(T - 1, None, T));
        assert!(!matches_active(T + 1, None, T));
    }

    #[test]
    fn test_future_filter_selects_upcoming_only() {
        assert!(matches_future(T + 1, T));
        assert!(matches_future(T, T));
        assert!(!matches_future(T - 1, T));
    }

    #[test]
    fn test_active_and_future_are_disjoint_for_strict_times() {
        // A currently-effective feature is active, not future.
        assert!(matches_active(T - 1, Some(T + 1), T));
        assert!(!matches_future(T - 1, T));
        // An upcoming feature is future, not active.
        assert!(matches_future(T + 1, T));
        assert!(!matches_active(T + 1, Some(T + 2), T));
    }

    #[test]
    fn test_filter_expression_shapes() {
        let active = active_tfr_filter(T);
        assert_eq!(active[0], "any");
        assert_eq!(active[1][1], json!(["<=", "date_effective", T]));
        assert_eq!(active[1][2], json!([">=", "date_expire", T]));
        assert_eq!(active[2][2], json!(["!has", "date_expire"]));

        let future = future_tfr_filter(T);
        assert_eq!(future, json!([">=", "date_effective", T]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updater_applies_filters_on_each_tick() {
        let renderer = Arc::new(MockRenderer::new());
        let updater = FilterUpdater::spawn(renderer.clone(), Duration::from_secs(300));

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(renderer.filter_calls(ACTIVE_TFRS), 1);
        assert_eq!(renderer.filter_calls(FUTURE_TFRS), 1);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(renderer.filter_calls(ACTIVE_TFRS), 2);

        updater.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_updater_stops_updating() {
        let renderer = Arc::new(MockRenderer::new());
        let updater = FilterUpdater::spawn(renderer.clone(), Duration::from_secs(300));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let before = renderer.filter_calls(ACTIVE_TFRS);

        updater.cancel();
        tokio::time::sleep(Duration::from_secs(1000)).await;

        assert!(updater.is_finished());
        assert_eq!(renderer.filter_calls(ACTIVE_TFRS), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let renderer = Arc::new(MockRenderer::new());
        let updater = FilterUpdater::spawn(renderer.clone(), Duration::from_secs(300));

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(updater);
        tokio::time::sleep(Duration::from_secs(1000)).await;

        assert_eq!(renderer.filter_calls(ACTIVE_TFRS), 1);
    }
}
