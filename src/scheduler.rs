use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Owns every background task plus one shutdown signal, so the whole set is
/// torn down together. Dropping the scheduler without `shutdown` also stops
/// the tasks at their next await point.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Runs `task` right away, then every `period` until shutdown. A run still
    /// in flight at shutdown is abandoned. Ticks missed while a run is slow
    /// are skipped, not replayed.
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }
                tokio::select! {
                    _ = task() => {}
                    _ = shutdown.changed() => break,
                }
            }
            debug!(task = name, "periodic task stopped");
        });
        self.handles.push((name, handle));
    }

    /// Runs `fut` once, abandoning it if shutdown comes first.
    pub fn spawn_once<Fut>(&mut self, name: &'static str, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = fut => {}
                _ = shutdown.changed() => {}
            }
            debug!(task = name, "one-shot task finished");
        });
        self.handles.push((name, handle));
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Signals every task and waits for all of them to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let (names, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();
        for (name, result) in names.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                warn!(task = name, "task ended abnormally: {e}");
            }
        }
        info!("Scheduler stopped");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn immediate_task_runs_before_first_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.spawn_periodic("t", Duration::from_secs(3600), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn periodic_task_repeats() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.spawn_periodic("t", Duration::from_millis(20), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(counter.load(Ordering::SeqCst) >= 3);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_every_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.spawn_periodic("a", Duration::from_millis(10), counting_task(&counter));
        scheduler.spawn_periodic("b", Duration::from_millis(10), counting_task(&counter));
        scheduler.spawn_once("slow", std::future::pending::<()>());
        assert_eq!(scheduler.task_count(), 3);

        tokio::time::timeout(Duration::from_secs(2), scheduler.shutdown())
            .await
            .expect("shutdown should not hang on a pending task");

        let after = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn shutdown_abandons_slow_run() {
        let mut scheduler = Scheduler::new();
        scheduler.spawn_periodic("stuck", Duration::from_secs(1), || {
            std::future::pending::<()>()
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        tokio::time::timeout(Duration::from_secs(2), scheduler.shutdown())
            .await
            .expect("in-flight run should be abandoned");
    }
}
