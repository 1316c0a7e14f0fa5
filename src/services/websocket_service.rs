use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{AnswerPayload, ClientMessage, InitPayload, ServerMessage},
    services::ticker_service::TimerTicker,
    state::{SharedState, TurnOutcome, TurnReply},
};

/// Errors raised while answering a player message.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle for an individual player WebSocket connection.
///
/// `session_id` is the connection's default session; an `INIT` carrying its own
/// id rebinds the connection to that session.
pub async fn handle_socket(state: SharedState, socket: WebSocket, session_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Single writer task: the driver and the ticker both go through this channel.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut session_id = session_id;
    let mut ticker = TimerTicker::spawn(state.clone(), session_id.clone(), outbound_tx.clone());
    info!(session_id = %session_id, "player connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let inbound = match ClientMessage::from_json_str(&text) {
                    Ok(inbound) => inbound,
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "dropping malformed player message");
                        continue;
                    }
                };

                match dispatch(&state, &session_id, inbound, &outbound_tx).await {
                    Ok(Some(rebound)) => {
                        info!(from = %session_id, to = %rebound, "connection rebound to session");
                        ticker.stop().await;
                        ticker =
                            TimerTicker::spawn(state.clone(), rebound.clone(), outbound_tx.clone());
                        session_id = rebound;
                    }
                    Ok(None) => {}
                    Err(DriverError::ConnectionClosed) => {
                        info!(session_id = %session_id, "connection closed while replying, terminating");
                        break;
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(session_id = %session_id, "player closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "websocket error");
                break;
            }
        }
    }

    ticker.stop().await;
    info!(session_id = %session_id, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Apply one decoded player message and queue the replies.
///
/// Returns the new session id when an `INIT` rebinds the connection.
/// Answers and passes on a missing or finished session produce no reply.
pub async fn dispatch(
    state: &SharedState,
    session_id: &str,
    message: ClientMessage,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<Option<String>, DriverError> {
    match message {
        ClientMessage::Init(InitPayload {
            language,
            session_id: requested,
        }) => {
            let target = requested.unwrap_or_else(|| session_id.to_string());
            let opened = state.sessions().get_or_create(&target, &language).await;
            debug!(
                session_id = %target,
                language = %opened.language,
                created = opened.created,
                "session opened"
            );
            send_message_to_websocket(outbound_tx, &ServerMessage::from(opened.snapshot))?;
            Ok((target != session_id).then_some(target))
        }
        ClientMessage::Answer(AnswerPayload { answer }) => {
            let reply = state.sessions().submit_answer(session_id, &answer).await;
            send_turn_reply(outbound_tx, reply)?;
            Ok(None)
        }
        ClientMessage::Pass => {
            let reply = state.sessions().pass(session_id).await;
            send_turn_reply(outbound_tx, reply)?;
            Ok(None)
        }
        ClientMessage::Unknown(kind) => {
            warn!(session_id = %session_id, kind = %kind, "ignoring unknown message type");
            Ok(None)
        }
    }
}

/// Queue the feedback (when the turn was applied) followed by the snapshot.
fn send_turn_reply(
    tx: &mpsc::UnboundedSender<Message>,
    reply: Option<TurnReply>,
) -> Result<(), DriverError> {
    let Some(TurnReply { outcome, snapshot }) = reply else {
        return Ok(());
    };

    if let TurnOutcome::Resolved(feedback) = outcome {
        send_message_to_websocket(tx, &ServerMessage::from(feedback))?;
    }
    send_message_to_websocket(tx, &ServerMessage::from(snapshot))
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Serialization failures are logged and swallowed; a closed writer is
/// reported as [`DriverError::ConnectionClosed`].
pub(crate) fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), DriverError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| DriverError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
