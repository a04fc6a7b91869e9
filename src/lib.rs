//! viva - adaptive interview session engine
//!
//! Drives a multi-turn, adaptive question/answer dialogue: each question is
//! generated from the session configuration plus the growing transcript,
//! answers arrive from typed text and streamed dictation concurrently, and
//! the finished transcript is handed to an external scoring collaborator.
//!
//! # Architecture
//!
//! - All session state lives in one value object owned by the controller;
//!   everything else observes it read-only
//! - Generation is a black box behind the `Gateway` trait; any conformant
//!   implementation can be swapped in without touching the state machine
//! - Failures preserve committed answers; retry re-issues the identical
//!   request
//!
//! # Modules
//!
//! - `domain`: Data structures (SessionConfig, Turn, Transcript, Phase)
//! - `session`: Controller state machine and the event loop driving it
//! - `capture`: Dictation stream → answer draft bridging
//! - `gateway`: Question/report generation boundary
//! - `export`: Result consumers (console, JSON)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run a five-question technical interview
//! viva run --types technical --topics rust,concurrency -n 5
//!
//! # Probe the generation gateway
//! viva check
//! ```

pub mod capture;
pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod gateway;
pub mod session;

// Re-export main types at crate root for convenience
pub use capture::{AnswerDraft, CaptureError, DictationSource, NoDictation, Segment, SpeechCapture};
pub use domain::{
    Difficulty, ExperienceLevel, InputMode, Notice, Phase, Report, SessionConfig, SessionOutcome,
    SessionState, Transcript, Turn,
};
pub use export::{ConsoleRenderer, JsonExporter, ResultConsumer};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use session::{Directive, Reception, SessionController, SessionError, SessionRunner, UserInput};
