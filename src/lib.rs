//! Client-side proof-of-work miner for a remote ledger service.
//!
//! A [`MiningSession`] asks the ledger for a job, searches nonces off the
//! async executor, submits the first solution it finds and then refreshes the
//! local [`ChainSnapshot`].

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pow;
pub mod session;

pub use chain::{Block, ChainSnapshot, ChainSync, Transaction};
pub use config::MinerConfig;
pub use error::{ConfigError, IntegrityError, SessionError, TransportError};
pub use ledger::{
    JobFetcher, LedgerClient, MiningJob, SolutionSubmitter, SubmissionResult, TransactionRelay,
};
pub use pow::{CancelToken, MiningOutcome, NonceSearcher};
pub use session::{CycleReport, MiningSession, SessionState, StatusEvent};
