use axum::extract::ws::Message;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info};

use crate::{
    dto::ws::{ServerMessage, TimerSyncPayload},
    services::websocket_service::send_message_to_websocket,
    state::{SessionSnapshot, SharedState},
};

/// Handle to the per-connection task that pushes clock updates.
///
/// The task stops on its own after sending the final scores. Otherwise it runs
/// until [`TimerTicker::stop`] is called or the handle is dropped.
pub struct TimerTicker {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TimerTicker {
    /// Start ticking for `session_id`, writing into `outbound_tx`.
    ///
    /// The first tick fires one interval after the call.
    pub fn spawn(
        state: SharedState,
        session_id: String,
        outbound_tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_ticker(state, session_id, outbound_tx, stop_rx));

        Self {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    /// Whether the task already exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

async fn run_ticker(
    state: SharedState,
    session_id: String,
    outbound_tx: mpsc::UnboundedSender<Message>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let period = state.config().tick_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // a dropped handle counts as a stop request
            _ = &mut stop_rx => {
                debug!(session_id = %session_id, "timer ticker cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let Some(snapshot) = state.sessions().get(&session_id).await else {
            continue;
        };

        match snapshot {
            SessionSnapshot::Active(view) => {
                let message = ServerMessage::TimerSync(TimerSyncPayload {
                    time_remaining: view.time_remaining,
                });
                if send_message_to_websocket(&outbound_tx, &message).is_err() {
                    debug!(session_id = %session_id, "writer closed; stopping timer ticker");
                    return;
                }
            }
            SessionSnapshot::GameOver(view) => {
                let _ = send_message_to_websocket(&outbound_tx, &ServerMessage::GameOver(view));
                info!(session_id = %session_id, "game over; stopping timer ticker");
                return;
            }
        }
    }
}
