use std::{collections::VecDeque, sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use tokio::time::Instant;
use utoipa::ToSchema;

use crate::state::catalog::Question;

/// Progress marker for one letter of the wheel.
///
/// Allowed transitions: `Unset -> Correct | Wrong | Passed` and
/// `Passed -> Passed | Correct | Wrong`. Resolved letters never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    /// Not attempted yet.
    Unset,
    /// Answered correctly.
    Correct,
    /// Answered incorrectly.
    Wrong,
    /// Skipped, waiting to be revisited.
    Passed,
}

impl LetterStatus {
    /// Whether moving from `self` to `next` respects the letter lifecycle.
    pub fn can_become(self, next: LetterStatus) -> bool {
        matches!(
            (self, next),
            (LetterStatus::Unset, LetterStatus::Correct | LetterStatus::Wrong | LetterStatus::Passed)
                | (LetterStatus::Passed, LetterStatus::Passed | LetterStatus::Correct | LetterStatus::Wrong)
        )
    }
}

/// One player's play-through, owned exclusively by the session store.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) session_id: String,
    pub(crate) language: String,
    pub(crate) questions: Arc<[Question]>,
    pub(crate) current_index: usize,
    pub(crate) letter_status: IndexMap<String, LetterStatus>,
    pub(crate) correct_count: u32,
    pub(crate) wrong_count: u32,
    pub(crate) pending_passes: VecDeque<usize>,
    pub(crate) is_revisiting: bool,
    pub(crate) started_at: Instant,
    pub(crate) duration: Duration,
    pub(crate) time_remaining: u64,
    pub(crate) is_game_over: bool,
}

impl SessionState {
    /// Fresh session positioned on the first question with every letter unset.
    pub fn new(
        session_id: impl Into<String>,
        language: impl Into<String>,
        questions: Arc<[Question]>,
        duration: Duration,
        started_at: Instant,
    ) -> Self {
        let letter_status = questions
            .iter()
            .map(|question| (question.letter.clone(), LetterStatus::Unset))
            .collect();

        Self {
            session_id: session_id.into(),
            language: language.into(),
            questions,
            current_index: 0,
            letter_status,
            correct_count: 0,
            wrong_count: 0,
            pending_passes: VecDeque::new(),
            is_revisiting: false,
            started_at,
            duration,
            time_remaining: duration.as_secs(),
            is_game_over: false,
        }
    }

    /// Catalog key in use after fallback resolution.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Resolved question sequence for this session.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Index of the active question.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The active question, absent once the wheel is exhausted.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_game_over {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// Status of every letter, in catalog order.
    pub fn letter_status(&self) -> &IndexMap<String, LetterStatus> {
        &self.letter_status
    }

    /// Number of correct answers so far.
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// Number of wrong answers so far.
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Passed question indices awaiting a revisit, oldest first.
    pub fn pending_passes(&self) -> &VecDeque<usize> {
        &self.pending_passes
    }

    /// True once the first linear pass through the questions has completed.
    pub fn is_revisiting(&self) -> bool {
        self.is_revisiting
    }

    /// Seconds left as of the last expiry check.
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    /// Terminal flag.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// Read-only outward view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.current_question() {
            Some(question) => SessionSnapshot::Active(ActiveView {
                letter: question.letter.clone(),
                prompt: question.prompt.clone(),
                current_index: self.current_index,
                letter_status: self.letter_status.clone(),
                time_remaining: self.time_remaining,
            }),
            None => SessionSnapshot::GameOver(GameOverView {
                correct_count: self.correct_count,
                wrong_count: self.wrong_count,
                passed_count: self.pending_passes.len(),
            }),
        }
    }
}

/// Projection of a session sent to its client after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSnapshot {
    /// The game is still running.
    Active(ActiveView),
    /// The game has ended, by exhaustion or by timeout.
    GameOver(GameOverView),
}

impl SessionSnapshot {
    /// Whether this is the terminal projection.
    pub fn is_game_over(&self) -> bool {
        matches!(self, SessionSnapshot::GameOver(_))
    }
}

/// View of the active question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveView {
    /// Letter of the active question.
    pub letter: String,
    /// Prompt of the active question.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Index of the active question in the session's sequence.
    #[serde(rename = "index")]
    pub current_index: usize,
    /// Status of every letter, in catalog order.
    #[serde(rename = "lettersState")]
    #[schema(value_type = Object)]
    pub letter_status: IndexMap<String, LetterStatus>,
    /// Seconds left on the clock.
    pub time_remaining: u64,
}

/// Final score view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameOverView {
    /// Correct answers.
    pub correct_count: u32,
    /// Wrong answers.
    pub wrong_count: u32,
    /// Questions still waiting in the pass queue when the game ended.
    pub passed_count: usize,
}
