use super::block::Block;
use crate::error::IntegrityError;

/// Read-only view of the ledger's chain at one point in time. Replaced as a
/// whole, never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSnapshot {
    length: usize,
    chain: Vec<Block>,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn tip(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Number of blocks credited to `address`.
    pub fn blocks_mined_by(&self, address: &str) -> usize {
        self.chain.iter().filter(|b| b.miner == address).count()
    }

    /// Check indices, hash linkage and every block's cached hash.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        for (position, block) in self.chain.iter().enumerate() {
            if block.index != position as u64 {
                return Err(IntegrityError::IndexGap {
                    position,
                    index: block.index,
                });
            }
            if position > 0 && block.previous_hash != self.chain[position - 1].hash {
                return Err(IntegrityError::BrokenLink { index: block.index });
            }
            if !block.has_valid_hash() {
                return Err(IntegrityError::HashMismatch { index: block.index });
            }
        }
        Ok(())
    }
}
