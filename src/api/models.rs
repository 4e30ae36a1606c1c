use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::sync::Arc;

use crate::chain::{Block, Transaction};
use crate::ledger::TransactionRelay;
use crate::session::{MiningSession, SessionState};

/// Shared state handed to every handler.
pub struct AppState {
    pub session: Arc<MiningSession>,
    pub relay: TransactionRelay,
}

/* ---------- Mining API Models ---------- */

#[derive(Serialize)]
pub struct BusyResponse {
    pub error: String,
    pub state: SessionState,
}

#[derive(Serialize)]
pub struct StartResponse {
    pub started: bool,
    pub state: SessionState,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub chain: &'a [Block],
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub emisor: String,
    pub receptor: String,
    pub cantidad: Number,
}

impl NewTxRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.emisor.trim().is_empty() || self.receptor.trim().is_empty() {
            return Err("emisor and receptor are required");
        }
        match self.cantidad.as_f64() {
            Some(amount) if amount > 0.0 => Ok(()),
            _ => Err("cantidad must be > 0"),
        }
    }

    pub fn into_transaction(self) -> Transaction {
        Transaction::new(self.emisor.trim(), self.receptor.trim(), self.cantidad)
    }
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
