//! Turn logic for a single session: expiry, answers, passes, and advancement.
//!
//! The engine keeps no state of its own. Every function takes the session it
//! mutates plus the current instant, so callers decide where time comes from.

use serde::Serialize;
use tokio::time::Instant;
use utoipa::ToSchema;

use crate::state::session::{LetterStatus, SessionState};

/// Feedback produced for one answered or passed letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Feedback {
    /// Letter that was just resolved or passed.
    pub letter: String,
    /// New status of that letter.
    pub status: LetterStatus,
    /// Whether the answer was correct; always false for passes.
    pub correct: bool,
}

/// Result of applying an answer or a pass to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The session was already over; nothing changed.
    Rejected,
    /// The clock ran out during this call; the turn was discarded.
    Expired,
    /// The turn was applied and the wheel advanced.
    Resolved(Feedback),
}

/// Refresh the remaining time and end the game once it reaches zero.
///
/// Outstanding and pending questions are left as they are.
pub fn check_expiry(state: &mut SessionState, now: Instant) {
    if state.is_game_over {
        return;
    }

    let elapsed = now.saturating_duration_since(state.started_at).as_secs();
    state.time_remaining = state.duration.as_secs().saturating_sub(elapsed);
    if state.time_remaining == 0 {
        state.is_game_over = true;
    }
}

/// Grade `raw_answer` against the active question and advance.
pub fn submit_answer(state: &mut SessionState, raw_answer: &str, now: Instant) -> TurnOutcome {
    if state.is_game_over {
        return TurnOutcome::Rejected;
    }

    check_expiry(state, now);
    if state.is_game_over {
        return TurnOutcome::Expired;
    }

    let Some(question) = state.questions.get(state.current_index) else {
        return TurnOutcome::Rejected;
    };
    let letter = question.letter.clone();
    let correct = answers_match(raw_answer, &question.expected_answer);

    let status = if correct {
        state.correct_count += 1;
        LetterStatus::Correct
    } else {
        state.wrong_count += 1;
        LetterStatus::Wrong
    };
    set_status(state, &letter, status);

    advance(state);

    TurnOutcome::Resolved(Feedback {
        letter,
        status,
        correct,
    })
}

/// Skip the active question, queueing it for a later revisit, and advance.
pub fn pass(state: &mut SessionState, now: Instant) -> TurnOutcome {
    if state.is_game_over {
        return TurnOutcome::Rejected;
    }

    check_expiry(state, now);
    if state.is_game_over {
        return TurnOutcome::Expired;
    }

    let Some(question) = state.questions.get(state.current_index) else {
        return TurnOutcome::Rejected;
    };
    let letter = question.letter.clone();

    set_status(state, &letter, LetterStatus::Passed);
    state.pending_passes.push_back(state.current_index);

    advance(state);

    TurnOutcome::Resolved(Feedback {
        letter,
        status: LetterStatus::Passed,
        correct: false,
    })
}

/// Select the next active question.
///
/// The first round walks the questions in order. Once it runs off the end,
/// the same call switches to revisiting and pulls the oldest pending pass;
/// an empty queue at that point ends the game.
pub fn advance(state: &mut SessionState) {
    if state.is_game_over {
        return;
    }

    if !state.is_revisiting {
        state.current_index += 1;
        if state.current_index >= state.questions.len() {
            state.is_revisiting = true;
        }
    }

    if state.is_revisiting {
        match state.pending_passes.pop_front() {
            Some(index) => state.current_index = index,
            None => state.is_game_over = true,
        }
    }
}

fn set_status(state: &mut SessionState, letter: &str, status: LetterStatus) {
    if let Some(current) = state.letter_status.get_mut(letter) {
        debug_assert!(
            current.can_become(status),
            "letter {letter} cannot go from {current:?} to {status:?}"
        );
        *current = status;
    }
}

fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}
