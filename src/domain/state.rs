//! Session state and user-visible notices.
//!
//! `SessionState` is an explicit value object owned and mutated only by the
//! session controller; everything else observes it read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::turn::Transcript;

/// Phase of the question/answer loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A question-generation request is pending or failed and retryable
    LoadingQuestion,

    /// A question has been delivered and awaits an answer
    AwaitingAnswer,

    /// An answer is being committed
    Submitting,

    /// A report-generation request is pending
    GeneratingReport,

    /// Report generation failed; the request may be re-issued against the
    /// same, unmodified transcript
    ReportRetryPending,

    /// The report was delivered; the session is finished
    Complete,
}

/// Mutable state of one interview session
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Unique identifier for this session
    pub session_id: Uuid,

    /// Number of committed turns; always equals `transcript.len()`
    pub current_index: usize,

    /// The delivered, not-yet-answered question (if any)
    pub pending_question: Option<String>,

    /// Committed turns so far
    pub transcript: Transcript,

    /// Current phase
    pub phase: Phase,

    /// When the session started
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    /// Fresh state at the start of a session
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_index: 0,
            pending_question: None,
            transcript: Transcript::new(),
            phase: Phase::LoadingQuestion,
            started_at: Utc::now(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Question generation failed; retryable
    QuestionFailed,

    /// Report generation failed; retryable
    ReportFailed,

    /// Voice capture could not start; text input remains usable
    CaptureUnavailable,
}

/// A dismissible, user-visible notification.
///
/// Notices surface recoverable failures; they never imply lost state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn question_failed(error: &dyn std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::QuestionFailed,
            message: format!("could not fetch the next question: {error}"),
        }
    }

    pub fn report_failed(error: &dyn std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::ReportFailed,
            message: format!("could not generate the report: {error}"),
        }
    }

    pub fn capture_unavailable(error: &dyn std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::CaptureUnavailable,
            message: format!("voice capture unavailable: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_invariant() {
        let state = SessionState::new();
        assert_eq!(state.current_index, state.transcript.len());
        assert_eq!(state.phase, Phase::LoadingQuestion);
        assert!(state.pending_question.is_none());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&Phase::ReportRetryPending).unwrap();
        assert_eq!(json, "\"report_retry_pending\"");
    }
}
