use crate::state::messages::UiEvent;
use log::debug;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic scoreboard refresh. Each tick is delivered as a `UiEvent` so the
/// controller can pair it with the filter that is active at that moment.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

/// Owner of a running refresher. Stopping, or dropping, the handle ends the task.
pub struct RefresherHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>, period: Duration) -> Self {
        Self { ui_events, period }
    }

    pub fn start(self) -> RefresherHandle {
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(self.run(stopped));
        RefresherHandle { stop: Some(stop), task }
    }

    async fn run(self, mut stopped: oneshot::Receiver<()>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => {
                    if self.ui_events.send(UiEvent::RefreshTick).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("periodic refresher stopped");
    }
}

impl RefresherHandle {
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}
