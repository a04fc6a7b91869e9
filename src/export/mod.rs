//! Result consumers for completed sessions.
//!
//! The engine emits `{report, transcript, config}` once, on completion;
//! consumers only display or export it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::domain::SessionOutcome;

/// Receives the finished session exactly once
#[async_trait]
pub trait ResultConsumer: Send + Sync {
    async fn deliver(&self, outcome: &SessionOutcome) -> Result<()>;
}

/// Writes the outcome as pretty JSON to `<dir>/<session_id>.json`
pub struct JsonExporter {
    dir: PathBuf,
}

impl JsonExporter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path the outcome for `outcome.session_id` will be written to
    pub fn path_for(&self, outcome: &SessionOutcome) -> PathBuf {
        self.dir.join(format!("{}.json", outcome.session_id))
    }
}

#[async_trait]
impl ResultConsumer for JsonExporter {
    async fn deliver(&self, outcome: &SessionOutcome) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.path_for(outcome);
        let json = serde_json::to_string_pretty(outcome).context("failed to encode outcome")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(path = %path.display(), "session exported");
        println!("Saved to {}", path.display());
        Ok(())
    }
}

/// Renders the report and a transcript summary to stdout
pub struct ConsoleRenderer;

#[async_trait]
impl ResultConsumer for ConsoleRenderer {
    async fn deliver(&self, outcome: &SessionOutcome) -> Result<()> {
        println!();
        println!("Interview complete: {} questions answered", outcome.transcript.len());
        println!("══════════════════════════════════════════════════════════════");
        let report = serde_json::to_string_pretty(outcome.report.as_value())
            .context("failed to render report")?;
        println!("{report}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{
        Difficulty, ExperienceLevel, InputMode, Report, SessionConfig, Transcript, Turn,
    };

    fn outcome() -> SessionOutcome {
        let mut transcript = Transcript::new();
        transcript.commit(Turn::new("q1", "a1"));
        transcript.commit(Turn::new("q2", "a2"));

        SessionOutcome {
            session_id: Uuid::new_v4(),
            config: SessionConfig {
                experience_level: ExperienceLevel::Junior,
                interview_types: vec!["behavioral".to_string()],
                topics: vec![],
                difficulty: Difficulty::Easy,
                question_count: 2,
                mode: InputMode::Text,
                resume_context: None,
            },
            transcript,
            report: Report::new(serde_json::json!({"overall_rating": 3})),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_json_exporter_writes_readable_outcome() {
        let temp = TempDir::new().unwrap();
        let exporter = JsonExporter::new(temp.path().join("sessions"));
        let outcome = outcome();

        exporter.deliver(&outcome).await.unwrap();

        let written = tokio::fs::read_to_string(exporter.path_for(&outcome))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();

        assert_eq!(value["report"]["overall_rating"], 3);
        assert_eq!(value["transcript"].as_array().unwrap().len(), 2);
        assert_eq!(value["config"]["question_count"], 2);
        assert_eq!(
            value["session_id"].as_str().unwrap(),
            outcome.session_id.to_string()
        );
    }

    #[tokio::test]
    async fn test_console_renderer_accepts_any_report_shape() {
        // The renderer never inspects the report; any JSON value works
        let renderer = ConsoleRenderer;
        renderer.deliver(&outcome()).await.unwrap();
    }
}
