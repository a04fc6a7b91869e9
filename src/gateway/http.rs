//! Chat-completion HTTP gateway.
//!
//! Talks to an OpenAI-compatible chat endpoint. Every call is wrapped in a
//! bounded timeout so a hung upstream surfaces as a retryable failure
//! instead of stalling the session loop indefinitely.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::debug;

use crate::config::GatewaySettings;
use crate::domain::{Difficulty, Report, SessionConfig, Turn};

use super::{Gateway, GatewayError};

/// Environment variables consulted for the API key, in order
const API_KEY_VARS: [&str; 2] = ["VIVA_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Gateway backed by an OpenAI-compatible chat-completion endpoint
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Build a gateway from resolved settings, reading the API key from the
    /// environment (VIVA_API_KEY, falling back to OPENAI_API_KEY)
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .with_context(|| format!("{} environment variable required", API_KEY_VARS[0]))?;

        Ok(Self::new(
            settings.base_url.clone(),
            api_key,
            settings.model.clone(),
            Duration::from_secs(settings.timeout_secs),
        ))
    }

    /// One chat-completion round trip, returning the assistant text
    async fn chat(&self, prompt: String, json_output: bool) -> Result<String, GatewayError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.4,
        });
        if json_output {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = timeout(self.timeout, request)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??
            .error_for_status()?;

        let parsed: ChatResponse = timeout(self.timeout, response.json())
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GatewayError::BadResponse("no completion choices".to_string()))?;

        Ok(content)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn generate_question(
        &self,
        config: &SessionConfig,
        history: &[Turn],
    ) -> Result<String, GatewayError> {
        debug!(history_len = history.len(), "requesting question");
        self.chat(question_prompt(config, history), false).await
    }

    async fn generate_report(
        &self,
        config: &SessionConfig,
        transcript: &[Turn],
    ) -> Result<Report, GatewayError> {
        debug!(turns = transcript.len(), "requesting report");
        let content = self.chat(report_prompt(config, transcript), true).await?;

        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| GatewayError::BadResponse(format!("report is not valid JSON: {e}")))?;

        Ok(Report::new(value))
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        let request = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send();

        timeout(self.timeout, request)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??
            .error_for_status()?;

        Ok(())
    }
}

/// Render committed turns for inclusion in a prompt
fn render_history(turns: &[Turn]) -> String {
    let mut rendered = String::new();
    for (i, turn) in turns.iter().enumerate() {
        rendered.push_str(&format!(
            "{n}. Q: {q}\n   A: {a}\n",
            n = i + 1,
            q = turn.question,
            a = turn.answer
        ));
    }
    rendered
}

fn difficulty_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Auto => {
            "Choose a difficulty appropriate to the candidate's previous answers."
        }
        Difficulty::Easy => "Keep the question easy.",
        Difficulty::Medium => "Keep the question at medium difficulty.",
        Difficulty::Hard => "Make the question hard.",
    }
}

fn question_prompt(config: &SessionConfig, history: &[Turn]) -> String {
    let mut prompt = format!(
        "You are conducting a {types} interview with a {level} candidate.\n",
        types = config.interview_types.join(", "),
        level = config.experience_level.as_str(),
    );

    if !config.topics.is_empty() {
        prompt.push_str(&format!("Focus on: {}.\n", config.topics.join(", ")));
    }
    if let Some(resume) = &config.resume_context {
        prompt.push_str(&format!("Candidate background:\n{resume}\n"));
    }

    if history.is_empty() {
        prompt.push_str("This is the first question of the interview.\n");
    } else {
        prompt.push_str(&format!(
            "Questions asked and answered so far:\n{}",
            render_history(history)
        ));
    }

    prompt.push_str(difficulty_instruction(config.difficulty));
    prompt.push_str(
        "\nAsk exactly one new interview question that does not repeat earlier ground. \
         Respond with only the question text, no preamble.",
    );
    prompt
}

fn report_prompt(config: &SessionConfig, transcript: &[Turn]) -> String {
    format!(
        "You are evaluating a completed {types} interview with a {level} candidate.\n\
         Full transcript:\n{history}\n\
         Write an assessment report. Respond with STRICT JSON only, shaped as:\n\
         {{\"overall_rating\": <1-5>, \"summary\": \"...\", \"strengths\": [\"...\"], \
         \"areas_for_improvement\": [\"...\"], \
         \"per_question\": [{{\"question\": \"...\", \"feedback\": \"...\", \"rating\": <1-5>}}]}}\n\
         Do not add any text outside the JSON object.",
        types = config.interview_types.join(", "),
        level = config.experience_level.as_str(),
        history = render_history(transcript),
    )
}
