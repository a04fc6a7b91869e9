//! Session runner: the single cooperative event loop.
//!
//! Wires the controller, the gateway, the capture adapter, and user input
//! together. Exactly one generation request is in flight at a time; while
//! one is awaited, capture segments and user input keep being serviced, but
//! answer submission is disabled. Failures surface as notices and park the
//! session until the user retries.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::capture::{AnswerDraft, DictationSource, Segment, SpeechCapture};
use crate::domain::{InputMode, Notice, Phase, SessionConfig, SessionOutcome, Turn};
use crate::export::ResultConsumer;
use crate::gateway::Gateway;

use super::controller::{Directive, Reception, SessionController, SessionError};

/// User actions fed into the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Append typed text to the answer draft
    Text(String),

    /// Submit the current draft as the answer
    Submit,

    /// Toggle voice capture
    ToggleCapture,

    /// Retry the failed generation request
    Retry,

    /// Discard the current draft
    ClearDraft,

    /// Abandon the session
    Quit,
}

/// What the loop should do next
enum Flow {
    /// Nothing pending; fall through to phase handling
    Idle,

    /// Execute this directive next
    Next(Directive),

    /// User abandoned the session
    Quit,

    /// Session completed with this outcome
    Finished(SessionOutcome),
}

/// Drives one interview session to completion or abandonment
pub struct SessionRunner<S> {
    controller: SessionController,
    pending: Option<Directive>,
    gateway: Arc<dyn Gateway>,
    capture: SpeechCapture<S>,
    draft: AnswerDraft,
    consumers: Vec<Box<dyn ResultConsumer>>,
    input: mpsc::Receiver<UserInput>,
}

impl<S: DictationSource> SessionRunner<S> {
    pub fn new(
        config: Option<SessionConfig>,
        gateway: Arc<dyn Gateway>,
        source: S,
        consumers: Vec<Box<dyn ResultConsumer>>,
        input: mpsc::Receiver<UserInput>,
    ) -> Result<Self, SessionError> {
        let (controller, first) = SessionController::initialize(config)?;
        Ok(Self {
            controller,
            pending: Some(first),
            gateway,
            capture: SpeechCapture::new(source),
            draft: AnswerDraft::new(),
            consumers,
            input,
        })
    }

    /// Run the session loop. Returns the outcome, or `None` when the user
    /// quit before completion (committed answers are logged, not lost by
    /// this layer; the controller state still holds them).
    pub async fn run(mut self) -> Result<Option<SessionOutcome>> {
        if self.controller.config().mode == InputMode::Voice {
            // Absence of dictation degrades voice mode; text stays usable
            if let Err(err) = self.capture.start().await {
                self.present_notice(&Notice::capture_unavailable(&err));
            }
        }

        loop {
            let flow = if let Some(directive) = self.pending.take() {
                self.execute(directive).await
            } else {
                match self.controller.phase() {
                    Phase::AwaitingAnswer => self.collect_answer().await,
                    Phase::LoadingQuestion | Phase::ReportRetryPending => {
                        self.await_retry().await
                    }
                    phase => {
                        anyhow::bail!("session stalled in {phase:?} with no pending request")
                    }
                }
            };

            match flow {
                Flow::Idle => {}
                Flow::Next(directive) => self.pending = Some(directive),
                Flow::Quit => {
                    info!(
                        answers = self.controller.state().transcript.len(),
                        "session abandoned"
                    );
                    self.capture.stop().await;
                    return Ok(None);
                }
                Flow::Finished(outcome) => {
                    self.capture.stop().await;
                    self.deliver(&outcome).await;
                    return Ok(Some(outcome));
                }
            }
        }
    }

    async fn execute(&mut self, directive: Directive) -> Flow {
        match directive {
            Directive::FetchQuestion { index, history } => {
                self.fetch_question(index, history).await
            }
            Directive::FetchReport { transcript } => self.fetch_report(transcript).await,
        }
    }

    /// Await the question for `index`, servicing capture and input meanwhile
    async fn fetch_question(&mut self, index: usize, history: Vec<Turn>) -> Flow {
        info!(index, history_len = history.len(), "fetching question");
        let gateway = Arc::clone(&self.gateway);
        let config = self.controller.config().clone();
        let mut call = gateway.generate_question(&config, &history);

        loop {
            tokio::select! {
                biased;

                result = &mut call => {
                    match result {
                        Ok(question) => {
                            if self.controller.on_question_received(question.clone(), index)
                                == Reception::Applied
                            {
                                self.present_question(&question);
                            }
                        }
                        Err(err) => {
                            let notice = self.controller.on_question_failed(&err);
                            self.present_notice(&notice);
                            println!("(type :retry to request the question again)");
                        }
                    }
                    return Flow::Idle;
                }

                segment = self.capture.next_segment() => {
                    self.handle_segment(segment);
                }

                input = self.input.recv() => {
                    if let Some(flow) = self.handle_suspended_input(input).await {
                        return flow;
                    }
                }
            }
        }
    }

    /// Await the report, servicing capture and input meanwhile
    async fn fetch_report(&mut self, transcript: Vec<Turn>) -> Flow {
        info!(turns = transcript.len(), "generating report");
        let gateway = Arc::clone(&self.gateway);
        let config = self.controller.config().clone();
        let mut call = gateway.generate_report(&config, &transcript);

        loop {
            tokio::select! {
                biased;

                result = &mut call => {
                    match result {
                        Ok(report) => {
                            if let Some(outcome) = self.controller.on_report_received(report) {
                                return Flow::Finished(outcome);
                            }
                            return Flow::Idle;
                        }
                        Err(err) => {
                            let notice = self.controller.on_report_failed(&err);
                            self.present_notice(&notice);
                            println!("(your answers are saved; type :retry to regenerate the report)");
                            return Flow::Idle;
                        }
                    }
                }

                segment = self.capture.next_segment() => {
                    self.handle_segment(segment);
                }

                input = self.input.recv() => {
                    if let Some(flow) = self.handle_suspended_input(input).await {
                        return flow;
                    }
                }
            }
        }
    }

    /// Service input and capture until an answer is committed
    async fn collect_answer(&mut self) -> Flow {
        loop {
            tokio::select! {
                biased;

                segment = self.capture.next_segment() => {
                    self.handle_segment(segment);
                }

                input = self.input.recv() => {
                    match input {
                        None | Some(UserInput::Quit) => return Flow::Quit,
                        Some(UserInput::Text(text)) => self.draft.append_text(&text),
                        Some(UserInput::ClearDraft) => {
                            self.draft.clear();
                            println!("(draft cleared)");
                        }
                        Some(UserInput::ToggleCapture) => self.toggle_capture().await,
                        Some(UserInput::Retry) => {
                            println!("(nothing to retry; answer the current question)");
                        }
                        Some(UserInput::Submit) => {
                            let text = self.draft.text().to_string();
                            match self.controller.submit_answer(&text) {
                                Ok(directive) => {
                                    self.draft.clear();
                                    self.capture.reset_buffer();
                                    return Flow::Next(directive);
                                }
                                Err(SessionError::EmptyAnswer) => {
                                    println!("(answer is empty; say or type something first)");
                                }
                                Err(err) => warn!(%err, "submission rejected"),
                            }
                        }
                    }
                }
            }
        }
    }

    /// Park after a failed request until the user retries or quits
    async fn await_retry(&mut self) -> Flow {
        loop {
            tokio::select! {
                biased;

                segment = self.capture.next_segment() => {
                    self.handle_segment(segment);
                }

                input = self.input.recv() => {
                    match input {
                        None | Some(UserInput::Quit) => return Flow::Quit,
                        Some(UserInput::Retry) => {
                            let retried = match self.controller.phase() {
                                Phase::ReportRetryPending => self.controller.retry_report(),
                                _ => self.controller.retry_question(),
                            };
                            match retried {
                                Ok(directive) => return Flow::Next(directive),
                                Err(err) => warn!(%err, "retry rejected"),
                            }
                        }
                        Some(UserInput::Text(text)) => self.draft.append_text(&text),
                        Some(UserInput::ClearDraft) => self.draft.clear(),
                        Some(UserInput::ToggleCapture) => self.toggle_capture().await,
                        Some(UserInput::Submit) => {
                            println!("(no question is awaiting an answer; type :retry)");
                        }
                    }
                }
            }
        }
    }

    /// Input handling shared by both gateway suspension points: submission
    /// is disabled, everything else stays live.
    async fn handle_suspended_input(&mut self, input: Option<UserInput>) -> Option<Flow> {
        match input {
            None | Some(UserInput::Quit) => Some(Flow::Quit),
            Some(UserInput::Text(text)) => {
                self.draft.append_text(&text);
                None
            }
            Some(UserInput::Submit) => {
                println!("(please wait, still talking to the generator)");
                None
            }
            Some(UserInput::ToggleCapture) => {
                self.toggle_capture().await;
                None
            }
            Some(UserInput::Retry) => {
                println!("(nothing to retry yet)");
                None
            }
            Some(UserInput::ClearDraft) => {
                self.draft.clear();
                None
            }
        }
    }

    fn handle_segment(&mut self, segment: Option<Segment>) {
        match segment {
            Some(segment) => {
                if segment.is_final {
                    println!("~ {}", segment.text);
                }
                self.capture.apply_segment(&segment, &mut self.draft);
            }
            None => {
                warn!("dictation stream ended");
                println!("(voice capture ended; :mic to restart)");
            }
        }
    }

    async fn toggle_capture(&mut self) {
        match self.capture.toggle().await {
            Ok(true) => println!("(voice capture on)"),
            Ok(false) => println!("(voice capture off)"),
            Err(err) => self.present_notice(&Notice::capture_unavailable(&err)),
        }
    }

    fn present_question(&self, question: &str) {
        let number = self.controller.state().current_index + 1;
        let total = self.controller.config().question_count;
        println!("\nQ{number}/{total}: {question}");
    }

    fn present_notice(&self, notice: &Notice) {
        warn!(kind = ?notice.kind, "{}", notice.message);
        println!("! {}", notice.message);
    }

    /// Hand the outcome to every consumer; a failing consumer never loses
    /// the outcome for the others.
    async fn deliver(&self, outcome: &SessionOutcome) {
        for consumer in &self.consumers {
            if let Err(err) = consumer.deliver(outcome).await {
                warn!(%err, "result consumer failed");
            }
        }
    }
}
