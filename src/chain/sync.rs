use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use super::snapshot::ChainSnapshot;
use crate::error::TransportError;
use crate::ledger::LedgerClient;
use crate::ledger::models::ChainResponse;

pub const CHAIN_PATH: &str = "/chain";

/// Sole writer of the local chain view.
pub struct ChainSync {
    client: LedgerClient,
    strict: bool,
    snapshot: watch::Sender<Arc<ChainSnapshot>>,
    // serializes fetches so an older download never replaces a newer one
    refresh: Mutex<()>,
}

impl ChainSync {
    /// With `strict`, chains that fail `ChainSnapshot::verify` are refused.
    pub fn new(client: LedgerClient, strict: bool) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ChainSnapshot::empty()));
        Self {
            client,
            strict,
            snapshot,
            refresh: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<ChainSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receives every replaced snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChainSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Download the chain and swap it in. On any failure the previous
    /// snapshot is kept and returned.
    pub async fn fetch_snapshot(&self) -> Arc<ChainSnapshot> {
        let _refresh = self.refresh.lock().await;

        let fresh = match self.download().await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!("chain sync failed, keeping previous snapshot: {e}");
                return self.current();
            }
        };

        if let Err(e) = fresh.verify() {
            if self.strict {
                warn!("chain sync refused invalid chain: {e}");
                return self.current();
            }
            warn!("ledger chain fails verification: {e}");
        }

        let fresh = Arc::new(fresh);
        let previous = self.snapshot.send_replace(Arc::clone(&fresh));
        if previous.len() != fresh.len() {
            info!("chain synced: {} -> {} blocks", previous.len(), fresh.len());
        } else {
            debug!("chain synced: {} blocks", fresh.len());
        }
        fresh
    }

    async fn download(&self) -> Result<ChainSnapshot, TransportError> {
        let resp: ChainResponse = self.client.get_json(CHAIN_PATH).await?;
        if resp.length != resp.chain.len() {
            return Err(TransportError::Malformed {
                url: self.client.url(CHAIN_PATH),
                reason: format!(
                    "length {} but {} blocks listed",
                    resp.length,
                    resp.chain.len()
                ),
            });
        }
        Ok(ChainSnapshot::new(resp.chain))
    }
}
