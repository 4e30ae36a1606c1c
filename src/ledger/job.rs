use log::debug;

use super::client::LedgerClient;
use super::models::{JobRequest, JobResponse};
use crate::error::TransportError;

pub const GET_JOB_PATH: &str = "/mine/get-job";

/// Next block to mine, as issued by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningJob {
    pub difficulty: u32,
    pub block_payload: String,
}

#[derive(Debug, Clone)]
pub struct JobFetcher {
    client: LedgerClient,
}

impl JobFetcher {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// One request, no retries.
    pub async fn request_job(&self, address: &str) -> Result<MiningJob, TransportError> {
        let resp: JobResponse = self
            .client
            .post_json(GET_JOB_PATH, &JobRequest { address })
            .await?;

        if resp.difficulty == 0 {
            return Err(TransportError::Malformed {
                url: self.client.url(GET_JOB_PATH),
                reason: "difficulty must be at least 1".into(),
            });
        }

        debug!(
            "job for {}: difficulty={} payload_len={}",
            address,
            resp.difficulty,
            resp.block_string.len()
        );
        Ok(MiningJob {
            difficulty: resp.difficulty,
            block_payload: resp.block_string,
        })
    }
}
