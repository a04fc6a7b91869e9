//! The speech capture adapter.
//!
//! Wraps a `DictationSource` with idempotent start/stop and the
//! append-only-on-final merge rule. The adapter writes only into the
//! current, not-yet-committed answer draft, never into committed turns.

use tokio::sync::mpsc;
use tracing::debug;

use super::draft::AnswerDraft;
use super::{CaptureError, DictationSource, Segment};

/// Per-capture-run accumulation of finalized segments.
///
/// Exists only while capture is active; reset when capture stops or the
/// turn is submitted. Resetting never touches text already appended to the
/// draft.
#[derive(Debug, Clone, Default)]
pub struct SpeechBuffer {
    segments: Vec<String>,
}

impl SpeechBuffer {
    pub fn push(&mut self, text: impl Into<String>) {
        self.segments.push(text.into());
    }

    pub fn reset(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Bridges a continuous dictation stream to the answer draft
pub struct SpeechCapture<S> {
    source: S,
    capturing: bool,
    segments: Option<mpsc::Receiver<Segment>>,
    buffer: SpeechBuffer,
}

impl<S: DictationSource> SpeechCapture<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            capturing: false,
            segments: None,
            buffer: SpeechBuffer::default(),
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn buffer(&self) -> &SpeechBuffer {
        &self.buffer
    }

    /// Begin continuous recognition. No-op when already capturing. On
    /// `CaptureUnavailable` the adapter stays inactive.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.capturing {
            return Ok(());
        }
        let rx = self.source.start().await?;
        self.segments = Some(rx);
        self.capturing = true;
        debug!("speech capture started");
        Ok(())
    }

    /// End recognition. No-op when not capturing. Resets the speech buffer
    /// but does not erase text already appended to the draft.
    pub async fn stop(&mut self) {
        if !self.capturing {
            return;
        }
        self.source.stop().await;
        self.segments = None;
        self.buffer.reset();
        self.capturing = false;
        debug!("speech capture stopped");
    }

    /// `start()` if idle, `stop()` if capturing. Returns the new state.
    pub async fn toggle(&mut self) -> Result<bool, CaptureError> {
        if self.capturing {
            self.stop().await;
            Ok(false)
        } else {
            self.start().await?;
            Ok(true)
        }
    }

    /// Next segment from the active capture run.
    ///
    /// Pends forever while not capturing, so this can sit in a `select!`
    /// arm unconditionally. Returns `None` when the stream closes on its
    /// own, after which the adapter is inactive again.
    pub async fn next_segment(&mut self) -> Option<Segment> {
        let Some(rx) = self.segments.as_mut() else {
            return std::future::pending().await;
        };
        match rx.recv().await {
            Some(segment) => Some(segment),
            None => {
                self.segments = None;
                self.buffer.reset();
                self.capturing = false;
                None
            }
        }
    }

    /// Merge a segment into the draft. Finalized segments are appended
    /// space-separated, in arrival order; interim hypotheses are discarded
    /// at this boundary.
    pub fn apply_segment(&mut self, segment: &Segment, draft: &mut AnswerDraft) {
        if !segment.is_final {
            debug!(text = %segment.text, "interim segment discarded");
            return;
        }
        self.buffer.push(segment.text.clone());
        draft.append_text(&segment.text);
    }

    /// Discard the per-run buffer; called when a turn is submitted
    pub fn reset_buffer(&mut self) {
        self.buffer.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;

    /// Dictation source that replays scripted segment runs, one per start
    struct ScriptedDictation {
        runs: VecDeque<Vec<Segment>>,
    }

    impl ScriptedDictation {
        fn new(runs: Vec<Vec<Segment>>) -> Self {
            Self {
                runs: runs.into(),
            }
        }
    }

    #[async_trait]
    impl DictationSource for ScriptedDictation {
        async fn start(&mut self) -> Result<mpsc::Receiver<Segment>, CaptureError> {
            let run = self.runs.pop_front().ok_or(CaptureError::Unavailable)?;
            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(async move {
                for segment in run {
                    if tx.send(segment).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }

        async fn stop(&mut self) {}
    }

    #[tokio::test]
    async fn test_interim_segments_never_reach_the_draft() {
        let source = ScriptedDictation::new(vec![vec![
            Segment::interim("Hello wo"),
            Segment::finalized("Hello world"),
        ]]);
        let mut capture = SpeechCapture::new(source);
        let mut draft = AnswerDraft::new();

        capture.start().await.unwrap();
        for _ in 0..2 {
            let segment = capture.next_segment().await.unwrap();
            capture.apply_segment(&segment, &mut draft);
        }

        assert_eq!(draft.text(), "Hello world");
        assert_eq!(capture.buffer().segments(), ["Hello world"]);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let source = ScriptedDictation::new(vec![vec![], vec![]]);
        let mut capture = SpeechCapture::new(source);

        capture.start().await.unwrap();
        // Second start must not consume the next scripted run
        capture.start().await.unwrap();
        assert!(capture.is_capturing());

        capture.stop().await;
        capture.start().await.unwrap();
        assert!(capture.is_capturing());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_a_noop() {
        let source = ScriptedDictation::new(vec![]);
        let mut capture = SpeechCapture::new(source);

        assert!(!capture.is_capturing());
        capture.stop().await;
        assert!(!capture.is_capturing());
    }

    #[tokio::test]
    async fn test_restart_does_not_duplicate_prior_text() {
        let source = ScriptedDictation::new(vec![
            vec![Segment::finalized("first pass")],
            vec![Segment::finalized("second pass")],
        ]);
        let mut capture = SpeechCapture::new(source);
        let mut draft = AnswerDraft::new();

        capture.start().await.unwrap();
        let segment = capture.next_segment().await.unwrap();
        capture.apply_segment(&segment, &mut draft);
        capture.stop().await;

        capture.start().await.unwrap();
        let segment = capture.next_segment().await.unwrap();
        capture.apply_segment(&segment, &mut draft);

        assert_eq!(draft.text(), "first pass second pass");
        // Buffer holds only the current run
        assert_eq!(capture.buffer().segments(), ["second pass"]);
    }

    #[tokio::test]
    async fn test_unavailable_source_leaves_adapter_idle() {
        let mut capture = SpeechCapture::new(super::super::NoDictation);
        let err = capture.start().await.unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable));
        assert!(!capture.is_capturing());
    }
}
