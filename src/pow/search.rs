use log::{debug, info, warn};
use std::time::{Duration, Instant};

use super::cancel::CancelToken;
use super::hash::{DIGEST_HEX_LEN, NonceHasher, meets_target};
use crate::ledger::MiningJob;

/// Result of one nonce search.
#[derive(Debug, Clone, PartialEq)]
pub enum MiningOutcome {
    Found {
        nonce: u64,
        hash: String,
        elapsed: Duration,
    },
    /// No nonce in `[0, cap]` met the target.
    Exhausted,
    Cancelled,
    /// The worker running the search did not hand back a result.
    TransportError(String),
}

/// Walks nonces 0, 1, ..., cap looking for the first hash with `difficulty`
/// leading zeros.
#[derive(Debug, Clone, Copy)]
pub struct NonceSearcher {
    check_interval: u64,
}

impl Default for NonceSearcher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CANCEL_CHECK_INTERVAL)
    }
}

impl NonceSearcher {
    /// `check_interval` is the number of nonces between two looks at the
    /// cancellation token; zero is treated as one.
    pub fn new(check_interval: u64) -> Self {
        Self {
            check_interval: check_interval.max(1),
        }
    }

    pub fn search(
        &self,
        payload: &str,
        difficulty: u32,
        cap: u64,
        cancel: &CancelToken,
    ) -> MiningOutcome {
        if difficulty as usize > DIGEST_HEX_LEN {
            warn!("difficulty {difficulty} exceeds digest width, nothing can qualify");
            return MiningOutcome::Exhausted;
        }

        debug!(
            "search start: difficulty={} cap={} payload_len={}",
            difficulty,
            cap,
            payload.len()
        );
        let started = Instant::now();
        let hasher = NonceHasher::new(payload);

        for nonce in 0..=cap {
            if nonce % self.check_interval == 0 && cancel.is_cancelled() {
                debug!("search cancelled at nonce {nonce}");
                return MiningOutcome::Cancelled;
            }

            let hash = hasher.digest(nonce);
            if meets_target(&hash, difficulty) {
                // a cancel raised while the last window ran still wins
                if cancel.is_cancelled() {
                    return MiningOutcome::Cancelled;
                }
                let elapsed = started.elapsed();
                let rate = (nonce + 1) as f64 / elapsed.as_secs_f64().max(1e-9);
                info!(
                    "nonce {} found in {:.3}s ({:.0} H/s) hash={}",
                    nonce,
                    elapsed.as_secs_f64(),
                    rate,
                    hash
                );
                return MiningOutcome::Found {
                    nonce,
                    hash,
                    elapsed,
                };
            }
        }

        debug!(
            "search exhausted after {} nonces in {:.3}s",
            cap.saturating_add(1),
            started.elapsed().as_secs_f64()
        );
        MiningOutcome::Exhausted
    }

    /// Searches a job, consuming it.
    pub fn search_job(&self, job: MiningJob, cap: u64, cancel: &CancelToken) -> MiningOutcome {
        self.search(&job.block_payload, job.difficulty, cap, cancel)
    }

    /// Runs the search on the blocking pool so the async executor keeps
    /// serving other work while hashes are computed.
    pub async fn spawn_search(&self, job: MiningJob, cap: u64, cancel: CancelToken) -> MiningOutcome {
        let searcher = *self;
        let worker_cancel = cancel.clone();
        let handle =
            tokio::task::spawn_blocking(move || searcher.search_job(job, cap, &worker_cancel));

        // if this future is dropped the worker must still stop
        let _stop_on_drop = StopOnDrop(cancel);
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("search worker failed: {e}");
                MiningOutcome::TransportError(e.to_string())
            }
        }
    }
}

struct StopOnDrop(CancelToken);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
