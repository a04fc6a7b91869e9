//! Speech Capture Integration Tests
//!
//! The capture adapter against a scripted dictation source: only finalized
//! segments reach the draft, restarts never duplicate text, and idle
//! stop/start behaves as a no-op.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use viva::capture::{
    AnswerDraft, CaptureError, DictationSource, NoDictation, Segment, SpeechCapture,
};

/// Dictation source replaying one scripted segment run per `start`
struct ScriptedDictation {
    runs: VecDeque<Vec<Segment>>,
}

impl ScriptedDictation {
    fn new(runs: Vec<Vec<Segment>>) -> Self {
        Self { runs: runs.into() }
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

async fn drain_run(capture: &mut SpeechCapture<ScriptedDictation>, draft: &mut AnswerDraft, n: usize) {
    for _ in 0..n {
        let segment = capture.next_segment().await.expect("scripted segment");
        capture.apply_segment(&segment, draft);
    }
}

#[tokio::test]
async fn test_interim_hypothesis_never_persisted() {
    let source = ScriptedDictation::new(vec![vec![
        Segment::interim("Hello wo"),
        Segment::finalized("Hello world"),
    ]]);
    let mut capture = SpeechCapture::new(source);
    let mut draft = AnswerDraft::new();

    capture.start().await.unwrap();
    drain_run(&mut capture, &mut draft, 2).await;

    // The interim hypothesis is discarded; the final text lands exactly once
    assert_eq!(draft.text(), "Hello world");
}

#[tokio::test]
async fn test_stop_then_start_does_not_duplicate_prior_text() {
    let source = ScriptedDictation::new(vec![
        vec![
            Segment::interim("Hello wo"),
            Segment::finalized("Hello world"),
        ],
        vec![Segment::finalized("and more")],
    ]);
    let mut capture = SpeechCapture::new(source);
    let mut draft = AnswerDraft::new();

    capture.start().await.unwrap();
    drain_run(&mut capture, &mut draft, 2).await;

    capture.stop().await;
    assert!(!capture.is_capturing());
    // Stopping never erases already-appended text
    assert_eq!(draft.text(), "Hello world");

    capture.start().await.unwrap();
    drain_run(&mut capture, &mut draft, 1).await;

    assert_eq!(draft.text(), "Hello world and more");
}

#[tokio::test]
async fn test_stop_when_not_capturing_is_a_noop() {
    let mut capture = SpeechCapture::new(ScriptedDictation::new(vec![]));

    capture.stop().await;
    capture.stop().await;
    assert!(!capture.is_capturing());
    assert!(capture.buffer().is_empty());
}

#[tokio::test]
async fn test_segments_applied_in_arrival_order() {
    let source = ScriptedDictation::new(vec![vec![
        Segment::finalized("first"),
        Segment::interim("sec"),
        Segment::finalized("second"),
        Segment::finalized("third"),
    ]]);
    let mut capture = SpeechCapture::new(source);
    let mut draft = AnswerDraft::new();

    capture.start().await.unwrap();
    drain_run(&mut capture, &mut draft, 4).await;

    assert_eq!(draft.text(), "first second third");
    assert_eq!(capture.buffer().segments(), ["first", "second", "third"]);
}

#[tokio::test]
async fn test_manual_edit_wins_over_prior_dictation() {
    let source = ScriptedDictation::new(vec![vec![Segment::finalized("dictated words")]]);
    let mut capture = SpeechCapture::new(source);
    let mut draft = AnswerDraft::new();

    capture.start().await.unwrap();
    drain_run(&mut capture, &mut draft, 1).await;

    // Last write wins on the shared buffer; no merge is attempted
    draft.set_text("typed replacement");
    assert_eq!(draft.text(), "typed replacement");

    capture.stop().await;
    assert_eq!(draft.text(), "typed replacement");
}

#[tokio::test]
async fn test_missing_capability_reports_unavailable_once_per_attempt() {
    let mut capture = SpeechCapture::new(NoDictation);

    for _ in 0..2 {
        let err = capture.start().await.unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable));
        assert!(!capture.is_capturing());
    }
}
