use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running poll. `stop` ends it cleanly; dropping the handle on any
/// other path aborts the task.
#[derive(Debug)]
pub struct PollHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

/// Runs `task` every `period`, first right away. Ticks are never run
/// concurrently: a slow round delays the next one.
pub fn start_polling<F, Fut>(period: Duration, mut task: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop_sender, mut stop_receiver) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticks.tick() => task().await,
                _ = &mut stop_receiver => break,
            }
        }
        debug!("polling stopped");
    });

    PollHandle {
        stop: Some(stop_sender),
        task: Some(join),
    }
}

impl PollHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Signals the poll to end and waits until it has.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("poll task ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
