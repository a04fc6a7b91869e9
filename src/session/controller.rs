//! Session controller: the question→answer→question state machine.
//!
//! The controller owns `SessionState` and is its only mutator. It is a
//! synchronous machine: operations return `Directive`s describing the
//! generation request to issue, and the runner feeds resolutions back as
//! `on_*` events. Failures at any generation step preserve the transcript
//! and the current index; retry re-issues the identical request.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    ConfigError, Notice, Phase, Report, SessionConfig, SessionOutcome, SessionState, Turn,
};
use crate::gateway::GatewayError;

/// Errors raised by controller operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session started without a configuration")]
    ConfigMissing,

    #[error("invalid session configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("cannot submit an answer while {phase:?}")]
    NotAwaitingAnswer { phase: Phase },

    #[error("a generation request is already in flight")]
    RequestInFlight,

    #[error("nothing to retry in phase {phase:?}")]
    NothingToRetry { phase: Phase },
}

/// A generation request the runner must execute against the gateway
#[derive(Debug, Clone)]
pub enum Directive {
    /// Fetch the question for `index`, threading the committed history
    FetchQuestion { index: usize, history: Vec<Turn> },

    /// Fetch the report for the complete transcript
    FetchReport { transcript: Vec<Turn> },
}

/// Whether a gateway response was applied or discarded as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reception {
    Applied,
    Discarded,
}

/// The single outstanding generation request, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Question(usize),
    Report,
}

/// Owns session state and drives all phase transitions
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    in_flight: Option<InFlight>,
}

impl SessionController {
    /// Start a session. Signals `ConfigMissing` when no configuration was
    /// supplied; otherwise validates it and returns the controller together
    /// with the first question directive (empty history).
    pub fn initialize(config: Option<SessionConfig>) -> Result<(Self, Directive), SessionError> {
        let config = config.ok_or(SessionError::ConfigMissing)?;
        config.validate()?;

        let mut controller = Self {
            config,
            state: SessionState::new(),
            in_flight: None,
        };
        info!(
            session_id = %controller.state.session_id,
            question_count = controller.config.question_count,
            "session initialized"
        );
        let directive = controller.issue_question();
        Ok((controller, directive))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// True only while a delivered question awaits an answer
    pub fn can_submit(&self) -> bool {
        self.state.phase == Phase::AwaitingAnswer
    }

    /// Commit the answer to the pending question.
    ///
    /// Rejected without state change unless a question is awaiting an answer
    /// and the trimmed text is non-empty. On commit, returns either the next
    /// question directive or, after the final answer, the report directive.
    pub fn submit_answer(&mut self, text: &str) -> Result<Directive, SessionError> {
        if self.state.phase != Phase::AwaitingAnswer {
            return Err(SessionError::NotAwaitingAnswer {
                phase: self.state.phase,
            });
        }
        let answer = text.trim();
        if answer.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        let question = self
            .state
            .pending_question
            .take()
            .ok_or(SessionError::NotAwaitingAnswer {
                phase: self.state.phase,
            })?;

        self.state.phase = Phase::Submitting;
        self.state.transcript.commit(Turn::new(question, answer));
        self.state.current_index += 1;
        debug_assert_eq!(self.state.current_index, self.state.transcript.len());
        info!(
            index = self.state.current_index,
            of = self.config.question_count,
            "answer committed"
        );

        if self.state.current_index == self.config.question_count {
            self.state.phase = Phase::GeneratingReport;
            Ok(self.issue_report())
        } else {
            self.state.phase = Phase::LoadingQuestion;
            Ok(self.issue_question())
        }
    }

    /// Apply a delivered question.
    ///
    /// Applied only when a question request for exactly `for_index` is
    /// outstanding and `for_index` still matches the current index; stale
    /// or superseded responses are discarded without side effects.
    pub fn on_question_received(
        &mut self,
        question: impl Into<String>,
        for_index: usize,
    ) -> Reception {
        let expected = self.state.phase == Phase::LoadingQuestion
            && self.in_flight == Some(InFlight::Question(for_index))
            && for_index == self.state.current_index;
        if !expected {
            warn!(
                for_index,
                current_index = self.state.current_index,
                phase = ?self.state.phase,
                "discarding stale question response"
            );
            return Reception::Discarded;
        }

        self.in_flight = None;
        self.state.pending_question = Some(question.into());
        self.state.phase = Phase::AwaitingAnswer;
        Reception::Applied
    }

    /// Record a failed question request. Phase stays `LoadingQuestion`; the
    /// transcript is untouched and `retry_question` re-issues the identical
    /// request.
    pub fn on_question_failed(&mut self, error: &GatewayError) -> Notice {
        self.in_flight = None;
        warn!(%error, index = self.state.current_index, "question generation failed");
        Notice::question_failed(error)
    }

    /// Re-issue the failed question request with the same history
    pub fn retry_question(&mut self) -> Result<Directive, SessionError> {
        if self.state.phase != Phase::LoadingQuestion {
            return Err(SessionError::NothingToRetry {
                phase: self.state.phase,
            });
        }
        if self.in_flight.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        Ok(self.issue_question())
    }

    /// Apply the delivered report: the session is complete and the outcome
    /// is handed to the result consumer. Returns `None` when no report
    /// request was outstanding.
    pub fn on_report_received(&mut self, report: Report) -> Option<SessionOutcome> {
        if self.state.phase != Phase::GeneratingReport
            || self.in_flight != Some(InFlight::Report)
        {
            warn!(phase = ?self.state.phase, "discarding unexpected report response");
            return None;
        }

        self.in_flight = None;
        self.state.phase = Phase::Complete;
        info!(session_id = %self.state.session_id, "session complete");

        Some(SessionOutcome {
            session_id: self.state.session_id,
            config: self.config.clone(),
            transcript: self.state.transcript.clone(),
            report,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Record a failed report request. The transcript and index are
    /// unchanged; the session parks in `ReportRetryPending` until
    /// `retry_report` re-issues the request against the same transcript.
    pub fn on_report_failed(&mut self, error: &GatewayError) -> Notice {
        self.in_flight = None;
        self.state.phase = Phase::ReportRetryPending;
        warn!(%error, "report generation failed");
        Notice::report_failed(error)
    }

    /// Re-issue the report request with the unmodified transcript
    pub fn retry_report(&mut self) -> Result<Directive, SessionError> {
        if self.state.phase != Phase::ReportRetryPending {
            return Err(SessionError::NothingToRetry {
                phase: self.state.phase,
            });
        }
        if self.in_flight.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        self.state.phase = Phase::GeneratingReport;
        Ok(self.issue_report())
    }

    /// Abandon the current session and start over with the same
    /// configuration. Any response still in flight for the old state no
    /// longer matches and will be discarded on arrival.
    pub fn reset(&mut self) -> Directive {
        info!(session_id = %self.state.session_id, "session reset");
        self.state = SessionState::new();
        self.in_flight = None;
        self.issue_question()
    }

    fn issue_question(&mut self) -> Directive {
        let index = self.state.current_index;
        self.in_flight = Some(InFlight::Question(index));
        debug!(index, "question request issued");
        Directive::FetchQuestion {
            index,
            history: self.state.transcript.history(),
        }
    }

    fn issue_report(&mut self) -> Directive {
        self.in_flight = Some(InFlight::Report);
        debug!("report request issued");
        Directive::FetchReport {
            transcript: self.state.transcript.history(),
        }
    }
}
