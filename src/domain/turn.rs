//! Committed question/answer turns and the append-only transcript.
//!
//! The transcript is the source of truth for session progress. It only ever
//! grows; committed turns are never reordered, truncated, or edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One committed question/answer pair.
///
/// Created exactly once, on successful answer submission; immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// The question as delivered by the generator
    pub question: String,

    /// The candidate's answer as submitted
    pub answer: String,

    /// When the answer was committed
    pub answered_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            answered_at: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of committed turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed turn. The only mutation the transcript supports.
    pub fn commit(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Context window for the next generation request.
    ///
    /// Equals every committed turn, in order. The pending question is never
    /// part of the transcript, so it can never leak into the history.
    pub fn history(&self) -> Vec<Turn> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.commit(Turn::new("q1", "a1"));
        transcript.commit(Turn::new("q2", "a2"));
        transcript.commit(Turn::new("q3", "a3"));

        let questions: Vec<&str> = transcript
            .turns()
            .iter()
            .map(|t| t.question.as_str())
            .collect();
        assert_eq!(questions, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_history_matches_committed_turns() {
        let mut transcript = Transcript::new();
        transcript.commit(Turn::new("q1", "a1"));
        transcript.commit(Turn::new("q2", "a2"));

        let history = transcript.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "q1");
        assert_eq!(history[1].answer, "a2");
    }

    #[test]
    fn test_serialization_is_a_plain_list() {
        let mut transcript = Transcript::new();
        transcript.commit(Turn::new("q", "a"));

        let json = serde_json::to_value(&transcript).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
