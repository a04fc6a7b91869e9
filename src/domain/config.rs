//! Session configuration.
//!
//! A `SessionConfig` is produced upstream (setup form, CLI flags, or a YAML
//! file) and treated as immutable input for the lifetime of a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("question_count must be greater than zero")]
    ZeroQuestionCount,

    #[error("at least one interview type is required")]
    NoInterviewTypes,
}

/// Candidate experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    /// Wire/prompt representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid-level",
            Self::Senior => "senior",
        }
    }
}

/// Question difficulty; `Auto` lets the generator adapt per answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Auto,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Auto => "auto",
        }
    }
}

/// How the candidate answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Text,
    Voice,
}

/// Immutable per-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Candidate experience level
    pub experience_level: ExperienceLevel,

    /// Interview categories (e.g. "technical", "behavioral")
    pub interview_types: Vec<String>,

    /// Topics to focus questions on
    #[serde(default)]
    pub topics: Vec<String>,

    /// Question difficulty
    pub difficulty: Difficulty,

    /// Number of questions to ask; must be > 0
    pub question_count: usize,

    /// Answer input mode
    pub mode: InputMode,

    /// Optional resume/background excerpt threaded into question prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_context: Option<String>,
}

impl SessionConfig {
    /// Check the constraints a session cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.question_count == 0 {
            return Err(ConfigError::ZeroQuestionCount);
        }
        if self.interview_types.is_empty() {
            return Err(ConfigError::NoInterviewTypes);
        }
        Ok(())
    }
}
