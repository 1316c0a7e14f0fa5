use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnNull, NoneAsEmptyString, serde_as};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::state::{
    engine::Feedback,
    session::{ActiveView, GameOverView, SessionSnapshot},
};

/// Raw `{type, payload}` envelope of every client frame.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Payload of an `INIT` message.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    /// Requested catalog language; unknown keys fall back to the default.
    #[serde(default)]
    pub language: String,
    /// Session to resume or create; the connection's own id when absent or empty.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,
}

/// Payload of an `ANSWER` message.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct AnswerPayload {
    /// Free-text answer for the active letter; missing or null grades as an empty answer.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub answer: String,
}

/// Messages accepted from player WebSocket clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Open or resume a session.
    Init(InitPayload),
    /// Answer the active question.
    Answer(AnswerPayload),
    /// Skip the active question.
    Pass,
    /// Any other `type`; logged and dropped.
    Unknown(String),
}

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum InboundError {
    /// The frame is not a `{type, payload}` JSON object.
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    /// The payload does not match the shape expected for its kind.
    #[error("malformed {kind} payload: {source}")]
    Payload {
        /// Message kind that failed to decode.
        kind: &'static str,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The payload decoded but holds out-of-range values.
    #[error("invalid payload: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl ClientMessage {
    /// Decode and validate a client text frame.
    pub fn from_json_str(text: &str) -> Result<Self, InboundError> {
        let Envelope { kind, payload } =
            serde_json::from_str(text).map_err(InboundError::Envelope)?;

        match kind.as_str() {
            "INIT" => {
                let init: InitPayload = decode_payload("INIT", payload)?;
                init.validate()?;
                Ok(Self::Init(init))
            }
            "ANSWER" => Ok(Self::Answer(decode_payload("ANSWER", payload)?)),
            "PASS" => Ok(Self::Pass),
            _ => Ok(Self::Unknown(kind)),
        }
    }
}

fn decode_payload<T>(kind: &'static str, payload: Value) -> Result<T, InboundError>
where
    T: serde::de::DeserializeOwned,
{
    // a missing payload decodes like an empty object so defaulted fields still apply
    let payload = if payload.is_null() {
        Value::Object(Default::default())
    } else {
        payload
    };
    serde_json::from_value(payload).map_err(|source| InboundError::Payload { kind, source })
}

/// Payload of a `TIMER_SYNC` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerSyncPayload {
    /// Seconds left on the clock.
    pub time_remaining: u64,
}

/// Payload of an `ERROR` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// Human readable description.
    pub message: String,
}

/// Messages pushed to player WebSocket clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// The active question and the wheel state.
    Question(ActiveView),
    /// Result of the last answer or pass; always followed by a snapshot.
    Feedback(Feedback),
    /// Periodic clock update while the game runs.
    TimerSync(TimerSyncPayload),
    /// Final scores.
    GameOver(GameOverView),
    /// Reserved for rejecting malformed input; the server currently drops such input silently.
    Error(ErrorPayload),
}

impl From<SessionSnapshot> for ServerMessage {
    fn from(snapshot: SessionSnapshot) -> Self {
        match snapshot {
            SessionSnapshot::Active(view) => ServerMessage::Question(view),
            SessionSnapshot::GameOver(view) => ServerMessage::GameOver(view),
        }
    }
}

impl From<Feedback> for ServerMessage {
    fn from(feedback: Feedback) -> Self {
        ServerMessage::Feedback(feedback)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;
    use crate::state::session::LetterStatus;

    #[test]
    fn decodes_init_with_and_without_session_id() {
        let msg = ClientMessage::from_json_str(
            r#"{"type": "INIT", "payload": {"language": "es", "sessionId": "abc"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Init(InitPayload {
                language: "es".into(),
                session_id: Some("abc".into()),
            })
        );

        let msg =
            ClientMessage::from_json_str(r#"{"type": "INIT", "payload": {"language": "en"}}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Init(InitPayload {
                language: "en".into(),
                session_id: None,
            })
        );
    }

    #[test]
    fn decodes_answer_and_pass() {
        let msg =
            ClientMessage::from_json_str(r#"{"type": "ANSWER", "payload": {"answer": " Paris "}}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Answer(AnswerPayload {
                answer: " Paris ".into(),
            })
        );

        assert_eq!(
            ClientMessage::from_json_str(r#"{"type": "PASS"}"#).unwrap(),
            ClientMessage::Pass
        );
        assert_eq!(
            ClientMessage::from_json_str(r#"{"type": "PASS", "payload": {}}"#).unwrap(),
            ClientMessage::Pass
        );
    }

    #[test]
    fn unknown_kinds_are_reported_not_rejected() {
        let msg = ClientMessage::from_json_str(r#"{"type": "HELLO", "payload": 3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown("HELLO".into()));
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(InboundError::Envelope(_))
        ));
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"payload": {}}"#),
            Err(InboundError::Envelope(_))
        ));
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"type": "ANSWER", "payload": {"answer": 4}}"#),
            Err(InboundError::Payload { kind: "ANSWER", .. })
        ));
        let too_long = format!(
            r#"{{"type": "INIT", "payload": {{"sessionId": "{}"}}}}"#,
            "x".repeat(129)
        );
        assert!(matches!(
            ClientMessage::from_json_str(&too_long),
            Err(InboundError::Invalid(_))
        ));
    }

    #[test]
    fn empty_session_id_counts_as_absent() {
        for text in [
            r#"{"type": "INIT", "payload": {"language": "en", "sessionId": ""}}"#,
            r#"{"type": "INIT", "payload": {"language": "en", "sessionId": null}}"#,
        ] {
            assert_eq!(
                ClientMessage::from_json_str(text).unwrap(),
                ClientMessage::Init(InitPayload {
                    language: "en".into(),
                    session_id: None,
                })
            );
        }
    }

    #[test]
    fn answer_without_text_decodes_as_empty() {
        for text in [
            r#"{"type": "ANSWER"}"#,
            r#"{"type": "ANSWER", "payload": {}}"#,
            r#"{"type": "ANSWER", "payload": {"answer": null}}"#,
        ] {
            assert_eq!(
                ClientMessage::from_json_str(text).unwrap(),
                ClientMessage::Answer(AnswerPayload {
                    answer: String::new(),
                })
            );
        }
    }

    #[test]
    fn encodes_outbound_messages_with_type_and_payload() {
        let mut letters = IndexMap::new();
        letters.insert("A".to_string(), LetterStatus::Wrong);
        letters.insert("B".to_string(), LetterStatus::Unset);

        let question = ServerMessage::Question(ActiveView {
            letter: "B".into(),
            prompt: "Q2".into(),
            current_index: 1,
            letter_status: letters,
            time_remaining: 250,
        });
        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            json!({
                "type": "QUESTION",
                "payload": {
                    "letter": "B",
                    "question": "Q2",
                    "index": 1,
                    "lettersState": {"A": "wrong", "B": "unset"},
                    "timeRemaining": 250
                }
            })
        );

        let feedback = ServerMessage::Feedback(Feedback {
            letter: "B".into(),
            status: LetterStatus::Passed,
            correct: false,
        });
        assert_eq!(
            serde_json::to_value(&feedback).unwrap(),
            json!({
                "type": "FEEDBACK",
                "payload": {"letter": "B", "status": "passed", "correct": false}
            })
        );

        let tick = ServerMessage::TimerSync(TimerSyncPayload { time_remaining: 12 });
        assert_eq!(
            serde_json::to_value(&tick).unwrap(),
            json!({"type": "TIMER_SYNC", "payload": {"timeRemaining": 12}})
        );

        let over = ServerMessage::GameOver(GameOverView {
            correct_count: 1,
            wrong_count: 1,
            passed_count: 0,
        });
        assert_eq!(
            serde_json::to_value(&over).unwrap(),
            json!({
                "type": "GAME_OVER",
                "payload": {"correctCount": 1, "wrongCount": 1, "passedCount": 0}
            })
        );
    }
}
