use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::status::{CycleReport, SessionState, StatusEvent};
use crate::chain::ChainSync;
use crate::config::MinerConfig;
use crate::error::{SessionError, TransportError};
use crate::ledger::{JobFetcher, LedgerClient, SolutionSubmitter, SubmissionResult};
use crate::pow::{CancelToken, MiningOutcome, NonceSearcher};

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_BUFFER: usize = 64;

/// Runs mining cycles for one address, one cycle at a time:
/// job -> search -> submit -> reconcile -> idle.
pub struct MiningSession {
    address: String,
    search_cap: u64,
    jobs: JobFetcher,
    searcher: NonceSearcher,
    submitter: SolutionSubmitter,
    chain: Arc<ChainSync>,
    status: watch::Sender<StatusEvent>,
    events: broadcast::Sender<StatusEvent>,
    cancel: Mutex<Option<CancelToken>>,
}

struct CycleTicket {
    id: Uuid,
    cancel: CancelToken,
}

impl MiningSession {
    pub fn new(config: &MinerConfig) -> Result<Self, TransportError> {
        let client = LedgerClient::new(&config.ledger_url, config.http_timeout)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: LedgerClient, config: &MinerConfig) -> Self {
        let idle = StatusEvent::new(Uuid::nil(), SessionState::Idle, "ready");
        let (status, _) = watch::channel(idle);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            address: config.miner_address.clone(),
            search_cap: config.search_cap,
            jobs: JobFetcher::new(client.clone()),
            searcher: NonceSearcher::new(config.cancel_check_interval),
            submitter: SolutionSubmitter::new(client.clone()),
            chain: Arc::new(ChainSync::new(client, config.strict_chain)),
            status,
            events,
            cancel: Mutex::new(None),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain(&self) -> &Arc<ChainSync> {
        &self.chain
    }

    pub fn state(&self) -> SessionState {
        self.status.borrow().state
    }

    /// Latest published transition.
    pub fn status(&self) -> StatusEvent {
        self.status.borrow().clone()
    }

    /// Follows the latest status; intermediate transitions may be skipped.
    pub fn watch_status(&self) -> watch::Receiver<StatusEvent> {
        self.status.subscribe()
    }

    /// Every transition from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// Run one full cycle. Fails only if another cycle is already active;
    /// every other outcome is described by the report.
    pub async fn run_mining_cycle(&self) -> Result<CycleReport, SessionError> {
        let ticket = self.begin()?;
        Ok(self.drive(ticket).await)
    }

    /// Claim the session now and drive the cycle on a spawned task.
    pub fn spawn_mining_cycle(self: &Arc<Self>) -> Result<JoinHandle<CycleReport>, SessionError> {
        let ticket = self.begin()?;
        let session = Arc::clone(self);
        Ok(tokio::spawn(async move { session.drive(ticket).await }))
    }

    /// Stop the running search. Returns false when no cycle is active.
    pub fn cancel(&self) -> bool {
        let cancelled = match self.cancel.lock().expect("mutex poisoned").as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        };
        if cancelled {
            info!("cancel requested (state: {})", self.state());
        }
        cancelled
    }

    fn begin(&self) -> Result<CycleTicket, SessionError> {
        let ticket = CycleTicket {
            id: Uuid::new_v4(),
            cancel: CancelToken::new(),
        };

        // check-and-set under the status lock so two callers cannot both start
        let mut busy = None;
        self.status.send_if_modified(|current| {
            if !current.state.is_idle() {
                busy = Some(current.state);
                return false;
            }
            *self.cancel.lock().expect("mutex poisoned") = Some(ticket.cancel.clone());
            *current = StatusEvent::new(
                ticket.id,
                SessionState::RequestingJob,
                format!("requesting job for {}", self.address),
            );
            true
        });
        if let Some(state) = busy {
            debug!("cycle refused, session is {state}");
            return Err(SessionError::Busy(state));
        }

        let _ = self.events.send(self.status());
        info!("cycle {} started for {}", ticket.id, self.address);
        Ok(ticket)
    }

    async fn drive(&self, ticket: CycleTicket) -> CycleReport {
        let CycleTicket { id, cancel } = ticket;
        let guard = CycleGuard {
            session: self,
            id,
            done: false,
        };

        let job = match self.jobs.request_job(&self.address).await {
            Ok(job) => job,
            Err(e) => {
                return guard.conclude(CycleReport::JobFailed {
                    reason: e.to_string(),
                });
            }
        };

        self.transition(
            id,
            SessionState::Searching,
            format!("mining, difficulty {}", job.difficulty),
        );
        let (nonce, hash, elapsed) =
            match self.searcher.spawn_search(job, self.search_cap, cancel).await {
                MiningOutcome::Found {
                    nonce,
                    hash,
                    elapsed,
                } => (nonce, hash, elapsed),
                MiningOutcome::Exhausted => {
                    return guard.conclude(CycleReport::SearchExhausted {
                        cap: self.search_cap,
                    });
                }
                MiningOutcome::Cancelled => return guard.conclude(CycleReport::SearchCancelled),
                MiningOutcome::TransportError(reason) => {
                    return guard.conclude(CycleReport::SearchFailed { reason });
                }
            };

        self.transition(
            id,
            SessionState::Submitting,
            format!(
                "found nonce {} in {:.2}s, submitting",
                nonce,
                elapsed.as_secs_f64()
            ),
        );
        match self.submitter.submit(nonce).await {
            SubmissionResult::Accepted => {}
            SubmissionResult::Rejected(reason) => {
                return guard.conclude(CycleReport::SubmissionRejected { reason });
            }
            SubmissionResult::TransportError(reason) => {
                return guard.conclude(CycleReport::SubmissionFailed { reason });
            }
        }

        self.transition(
            id,
            SessionState::Reconciling,
            "solution accepted, refreshing chain",
        );
        let snapshot = self.chain.fetch_snapshot().await;

        guard.conclude(CycleReport::Mined {
            nonce,
            hash,
            elapsed_secs: elapsed.as_secs_f64(),
            chain_length: snapshot.len(),
            blocks_mined: snapshot.blocks_mined_by(&self.address),
        })
    }

    fn transition(&self, id: Uuid, state: SessionState, message: impl Into<String>) {
        let event = StatusEvent::new(id, state, message);
        debug!("cycle {}: {} ({})", id, event.state, event.message);
        self.status.send_replace(event.clone());
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn finish(&self, id: Uuid, report: &CycleReport) {
        let summary = report.summary();
        match report.branch() {
            None => info!("cycle {id}: {summary}"),
            Some(branch) => {
                warn!("cycle {id}: {summary}");
                self.transition(id, branch, summary.clone());
            }
        }
        self.cancel.lock().expect("mutex poisoned").take();
        self.transition(id, SessionState::Idle, summary);
    }

    fn abandon(&self, id: Uuid) {
        if let Some(token) = self.cancel.lock().expect("mutex poisoned").take() {
            token.cancel();
        }
        warn!("cycle {id} dropped before finishing");
        self.transition(id, SessionState::Idle, "cycle abandoned");
    }
}

/// Returns the session to `Idle` even if the cycle future is dropped midway.
struct CycleGuard<'a> {
    session: &'a MiningSession,
    id: Uuid,
    done: bool,
}

impl CycleGuard<'_> {
    fn conclude(mut self, report: CycleReport) -> CycleReport {
        self.done = true;
        self.session.finish(self.id, &report);
        report
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.session.abandon(self.id);
        }
    }
}
