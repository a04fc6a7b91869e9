//! Report payload and the completed-session outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::SessionConfig;
use super::turn::Transcript;

/// Opaque report produced by the generation gateway.
///
/// The engine stores and forwards it; it never inspects the structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(serde_json::Value);

impl Report {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Everything a result consumer receives for a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    /// The session this outcome belongs to
    pub session_id: Uuid,

    /// Configuration the session ran with
    pub config: SessionConfig,

    /// The complete, ordered transcript
    pub transcript: Transcript,

    /// The generated report
    pub report: Report,

    /// When the report was delivered
    pub completed_at: DateTime<Utc>,
}
