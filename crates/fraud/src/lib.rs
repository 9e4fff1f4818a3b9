//! `corebank-fraud` — fraud-annotation collaborator.
//!
//! The scorer is an opaque external service consulted out-of-band for
//! reporting. It never blocks money movement, and its failures never reach
//! the caller: reporting paths substitute a neutral verdict and move on.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summary of a committed transaction, shaped for the scorer.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    pub amount: f64,
    /// RFC 3339.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub receiver_account: String,
    /// Absent for deposits.
    pub sender_account: Option<String>,
}

/// Verdict returned by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudVerdict {
    pub is_fraud: bool,
    pub risk_score: f64,
}

impl FraudVerdict {
    /// The stand-in used whenever the scorer cannot answer.
    pub fn neutral() -> Self {
        Self {
            is_fraud: false,
            risk_score: 0.0,
        }
    }
}

/// The scorer could not be reached or did not answer sensibly.
#[derive(Debug, Error)]
#[error("fraud scorer unavailable: {0}")]
pub struct FraudError(#[from] reqwest::Error);

/// Scores transactions for suspicion.
///
/// Implementations must be side-effect free from the ledger's perspective.
#[async_trait]
pub trait FraudScorer: Send + Sync {
    async fn score(&self, summary: &TransactionSummary) -> Result<FraudVerdict, FraudError>;
}

/// Remote scorer speaking the `/predict-fraud` JSON contract.
pub struct HttpFraudScorer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFraudScorer {
    /// A short timeout keeps the reporting path snappy when the scorer hangs;
    /// a timeout is just another absorbed failure.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FraudError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl FraudScorer for HttpFraudScorer {
    async fn score(&self, summary: &TransactionSummary) -> Result<FraudVerdict, FraudError> {
        let verdict = self
            .client
            .post(&self.endpoint)
            .json(summary)
            .send()
            .await?
            .error_for_status()?
            .json::<FraudVerdict>()
            .await?;
        Ok(verdict)
    }
}

/// Scorer used when no endpoint is configured; always answers neutral.
#[derive(Debug, Default, Clone)]
pub struct NeutralScorer;

#[async_trait]
impl FraudScorer for NeutralScorer {
    async fn score(&self, _summary: &TransactionSummary) -> Result<FraudVerdict, FraudError> {
        Ok(FraudVerdict::neutral())
    }
}

/// Ask `scorer`, absorbing any failure into the neutral verdict.
pub async fn score_or_default(
    scorer: &dyn FraudScorer,
    summary: &TransactionSummary,
) -> FraudVerdict {
    match scorer.score(summary).await {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::warn!("fraud scorer failed, substituting neutral verdict: {err}");
            FraudVerdict::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingScorer;

    #[async_trait]
    impl FraudScorer for FailingScorer {
        async fn score(&self, _: &TransactionSummary) -> Result<FraudVerdict, FraudError> {
            // an unroutable endpoint produces a real transport error
            let err = reqwest::Client::new()
                .get("http://127.0.0.1:1/unreachable")
                .send()
                .await
                .unwrap_err();
            Err(FraudError(err))
        }
    }

    fn summary() -> TransactionSummary {
        TransactionSummary {
            amount: 100.0,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            kind: "TRANSFER".to_string(),
            receiver_account: "r".to_string(),
            sender_account: Some("s".to_string()),
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_the_neutral_verdict() {
        let verdict = score_or_default(&FailingScorer, &summary()).await;
        assert_eq!(verdict, FraudVerdict::neutral());
    }

    #[tokio::test]
    async fn neutral_scorer_flags_nothing() {
        let verdict = score_or_default(&NeutralScorer, &summary()).await;
        assert!(!verdict.is_fraud);
        assert_eq!(verdict.risk_score, 0.0);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_absorbed() {
        let scorer = HttpFraudScorer::new("http://127.0.0.1:1/predict-fraud").unwrap();
        let verdict = score_or_default(&scorer, &summary()).await;
        assert_eq!(verdict, FraudVerdict::neutral());
    }

    #[test]
    fn summary_wire_shape_matches_the_scorer_contract() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["type"], "TRANSFER");
        assert!(json["amount"].is_f64());
        assert_eq!(json["sender_account"], "s");
    }
}
