use log::{info, warn};

use super::client::LedgerClient;
use super::models::{SubmitRequest, SubmitResponse};

pub const SUBMIT_PATH: &str = "/mine/submit-solution";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Accepted,
    /// The ledger turned the nonce down, usually because another miner's
    /// block landed first. Not an error.
    Rejected(String),
    TransportError(String),
}

#[derive(Debug, Clone)]
pub struct SolutionSubmitter {
    client: LedgerClient,
}

impl SolutionSubmitter {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, nonce: u64) -> SubmissionResult {
        let resp = match self.client.post(SUBMIT_PATH, &SubmitRequest { nonce }).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("submit nonce={nonce}: {e}");
                return SubmissionResult::TransportError(e.to_string());
            }
        };

        let status = resp.status();
        // the body is informational only; an unreadable one does not change the verdict
        let body: SubmitResponse = resp
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();

        if status.is_success() {
            info!(
                "ACCEPTED nonce={} hash={}",
                nonce,
                body.hash.as_deref().unwrap_or("?")
            );
            SubmissionResult::Accepted
        } else {
            let reason = match body.message {
                Some(msg) => format!("{status}: {msg}"),
                None => status.to_string(),
            };
            warn!("REJECTED nonce={nonce}: {reason}");
            SubmissionResult::Rejected(reason)
        }
    }
}
