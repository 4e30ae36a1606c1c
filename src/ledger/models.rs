use serde::{Deserialize, Serialize};

use crate::chain::{Block, Transaction};

/* ---------- Mining ---------- */

#[derive(Serialize)]
pub struct JobRequest<'a> {
    pub address: &'a str,
}

#[derive(Deserialize)]
pub struct JobResponse {
    pub difficulty: u32,
    pub block_string: String,
}

#[derive(Serialize)]
pub struct SubmitRequest {
    pub nonce: u64,
}

/// Body the ledger attaches to both accepted and rejected submissions.
#[derive(Deserialize, Default)]
pub struct SubmitResponse {
    #[serde(default, rename = "mensaje")]
    pub message: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/* ---------- Chain ---------- */

#[derive(Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

/* ---------- Transactions ---------- */

#[derive(Deserialize)]
pub struct NewTransactionResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
}

#[derive(Deserialize)]
pub struct PendingResponse {
    #[serde(rename = "transacciones_pendientes")]
    pub transactions: Vec<Transaction>,
    #[serde(rename = "cantidad")]
    pub count: usize,
}
