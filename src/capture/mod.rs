//! Speech capture: bridging a continuous dictation stream to the answer draft.
//!
//! The platform dictation capability is modeled as a subscribable event
//! channel (`DictationSource`), not a synchronous call: recognition results
//! arrive as interim/final `Segment`s and only finalized text is ever merged
//! into the answer draft.

pub mod draft;
pub mod speech;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use draft::AnswerDraft;
pub use speech::{SpeechBuffer, SpeechCapture};

/// Errors that can occur with speech capture
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no dictation capability is available on this platform")]
    Unavailable,

    #[error("dictation stream closed unexpectedly")]
    SourceClosed,
}

/// One recognition result from the dictation stream
#[derive(Debug, Clone)]
pub struct Segment {
    /// Recognized text
    pub text: String,

    /// Whether the recognizer has finalized this text. Interim hypotheses
    /// carry `false` and are discarded at the capture boundary.
    pub is_final: bool,
}

impl Segment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Platform dictation capability.
///
/// `start` begins continuous, interim-enabled recognition and hands back the
/// segment channel for this capture run; the channel closes when recognition
/// ends. `stop` ends recognition; already-delivered segments are unaffected.
#[async_trait]
pub trait DictationSource: Send {
    async fn start(&mut self) -> Result<mpsc::Receiver<Segment>, CaptureError>;

    async fn stop(&mut self);
}

/// Stand-in for platforms without a dictation capability.
///
/// `start` always reports `CaptureUnavailable`, which degrades voice mode to
/// unavailable while leaving text input fully functional.
#[derive(Debug, Default)]
pub struct NoDictation;

#[async_trait]
impl DictationSource for NoDictation {
    async fn start(&mut self) -> Result<mpsc::Receiver<Segment>, CaptureError> {
        Err(CaptureError::Unavailable)
    }

    async fn stop(&mut self) {}
}
