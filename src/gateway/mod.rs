//! Gateway interface for question and report generation.
//!
//! The generation logic is a black box behind this trait: any conformant
//! implementation (template engine, rule table, remote model call) can be
//! substituted without touching the session state machine.

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Report, SessionConfig, Turn};

pub use http::HttpGateway;

/// Errors from a generation call. All variants are transient: state is
/// preserved at the call site and the identical request may be re-issued.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway request timed out after {0:?}")]
    Timeout(Duration),

    #[error("gateway returned an unusable response: {0}")]
    BadResponse(String),
}

/// External question/report generation collaborator
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Generate the next question from the configuration and the committed
    /// history. The history for request `n` is exactly the first `n`
    /// committed turns; the pending question is never included.
    async fn generate_question(
        &self,
        config: &SessionConfig,
        history: &[Turn],
    ) -> Result<String, GatewayError>;

    /// Generate the final report from the complete transcript
    async fn generate_report(
        &self,
        config: &SessionConfig,
        transcript: &[Turn],
    ) -> Result<Report, GatewayError>;

    /// Reachability probe, used by `viva check`
    async fn health_check(&self) -> Result<(), GatewayError>;
}
