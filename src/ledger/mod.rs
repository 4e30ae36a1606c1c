pub mod client;
pub mod job;
pub mod models;
pub mod submit;
pub mod tx;

pub use client::LedgerClient;
pub use job::{JobFetcher, MiningJob};
pub use submit::{SolutionSubmitter, SubmissionResult};
pub use tx::TransactionRelay;
