use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// A periodic task's callback: takes no arguments, returns a future.
/// Boxed so the coordinator can close over per-tick state without the
/// ticker factory needing to know its concrete type.
pub type TickFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// `schedule(interval, fn) -> handle`; `handle.stop()` prevents future
/// invocations. In-flight ticks are allowed to finish (spec §9).
pub trait TickerFactory: Send + Sync {
    fn schedule(&self, interval_seconds: i32, task: TickFn) -> PeriodicTask;
}

/// Handle to a live periodic task. The coordinator never awaits a
/// handle directly; it only ever stops one.
pub struct PeriodicTask {
    handle: tokio::task::JoinHandle<()>,
}

impl PeriodicTask {
    pub fn stop(self) {
        self.handle.abort();
    }
}

pub struct TokioTickerFactory;

impl TickerFactory for TokioTickerFactory {
    fn schedule(&self, interval_seconds: i32, task: TickFn) -> PeriodicTask {
        let interval = Duration::from_secs(interval_seconds.max(1) as u64);
        let handle = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            // The first `tick()` resolves immediately; the caller already
            // performed the initial non-delta emit before scheduling, so
            // that immediate tick is consumed here without firing the task.
            interval_timer.tick().await;
            loop {
                interval_timer.tick().await;
                task().await;
            }
        });
        PeriodicTask { handle }
    }
}
