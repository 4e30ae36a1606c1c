use log::{debug, info};

use super::client::LedgerClient;
use super::models::{NewTransactionResponse, PendingResponse};
use crate::chain::Transaction;
use crate::error::TransportError;

pub const NEW_TRANSACTION_PATH: &str = "/transactions/new";
pub const PENDING_PATH: &str = "/transactions/pending";

/// Forwards transactions to the ledger's mempool. Sits beside the mining core,
/// not inside it.
#[derive(Debug, Clone)]
pub struct TransactionRelay {
    client: LedgerClient,
}

impl TransactionRelay {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// Returns the ledger's acknowledgement message.
    pub async fn send(&self, tx: &Transaction) -> Result<String, TransportError> {
        let resp: NewTransactionResponse = self.client.post_json(NEW_TRANSACTION_PATH, tx).await?;
        info!(
            "tx {} -> {} ({}) relayed: {}",
            tx.sender, tx.receiver, tx.amount, resp.message
        );
        Ok(resp.message)
    }

    pub async fn pending(&self) -> Result<Vec<Transaction>, TransportError> {
        let resp: PendingResponse = self.client.get_json(PENDING_PATH).await?;
        if resp.count != resp.transactions.len() {
            return Err(TransportError::Malformed {
                url: self.client.url(PENDING_PATH),
                reason: format!(
                    "cantidad {} but {} transactions listed",
                    resp.count,
                    resp.transactions.len()
                ),
            });
        }
        debug!("mempool holds {} transactions", resp.count);
        Ok(resp.transactions)
    }
}
