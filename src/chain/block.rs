use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::canonical::block_payload;
use crate::pow::hash::{NonceHasher, meets_target};

/// A transfer recorded in a block. Amounts are kept as the ledger sent them so
/// that re-serializing a block reproduces its hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "emisor")]
    pub sender: String,
    #[serde(rename = "receptor")]
    pub receiver: String,
    #[serde(rename = "cantidad")]
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: amount.into(),
        }
    }
}

/// A block as the ledger publishes it on `GET /chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: Number, // Unix seconds, usually fractional
    #[serde(rename = "transacciones")]
    pub transactions: Vec<Transaction>,
    pub hash: String,
    #[serde(rename = "hash_anterior")]
    pub previous_hash: String,
    pub nonce: u64,
    #[serde(rename = "minero")]
    pub miner: String,
}

impl Block {
    /// An unmined block with nonce 0, hashed the way the ledger hashes a
    /// fresh candidate.
    pub fn candidate(
        index: u64,
        timestamp: Number,
        transactions: Vec<Transaction>,
        previous_hash: String,
        miner: String,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            hash: String::new(),
            previous_hash,
            nonce: 0,
            miner,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Fix the nonce and recompute the cached hash.
    pub fn seal(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self.hash = self.compute_hash();
        self
    }

    /// Timestamp truncated to whole seconds.
    pub fn timestamp_secs(&self) -> i64 {
        self.timestamp
            .as_i64()
            .or_else(|| self.timestamp.as_f64().map(|secs| secs as i64))
            .unwrap_or_default()
    }

    /// The text a mining job for this block carries as `block_string`.
    pub fn payload(&self) -> String {
        block_payload(self)
    }

    /// SHA-256 of the payload followed by the decimal nonce.
    pub fn compute_hash(&self) -> String {
        NonceHasher::new(&self.payload()).digest(self.nonce)
    }

    /// The cached `hash` matches the block's contents.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_target(&self.hash, difficulty)
    }
}
