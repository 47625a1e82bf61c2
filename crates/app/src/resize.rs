use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Collapses bursts of raw width readings into a single observation.
///
/// Every reading restarts the quiet-period timer; only the latest width is
/// delivered once the burst settles, which bounds layout recomputation under
/// continuous resize.
pub struct ResizeDebouncer {
    quiet_period: Duration,
    latest_width: Arc<Mutex<Option<f32>>>,
    apply: Arc<dyn Fn(f32) + Send + Sync>,
    timer: Option<JoinHandle<()>>,
}

impl ResizeDebouncer {
    pub fn new(quiet_period: Duration, apply: impl Fn(f32) + Send + Sync + 'static) -> Self {
        Self {
            quiet_period,
            latest_width: Arc::new(Mutex::new(None)),
            apply: Arc::new(apply),
            timer: None,
        }
    }

    /// Records a raw width reading and restarts the quiet period.
    pub fn observe(&mut self, width: f32) {
        *lock(&self.latest_width) = Some(width);

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let latest_width = Arc::clone(&self.latest_width);
        let apply = Arc::clone(&self.apply);
        let quiet_period = self.quiet_period;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if let Some(width) = lock(&latest_width).take() {
                apply(width);
            }
        }));
    }
}

impl Drop for ResizeDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

fn lock(latest: &Mutex<Option<f32>>) -> MutexGuard<'_, Option<f32>> {
    latest.lock().unwrap_or_else(PoisonError::into_inner)
}
