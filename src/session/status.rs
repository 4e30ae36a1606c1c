use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Where a mining session is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    RequestingJob,
    Searching,
    Submitting,
    Reconciling,
    JobFailed,
    SearchExhausted,
    SearchCancelled,
    SearchFailed,
    SubmissionRejected,
    SubmissionFailed,
}

impl SessionState {
    pub fn is_idle(self) -> bool {
        self == SessionState::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::RequestingJob => "requesting_job",
            SessionState::Searching => "searching",
            SessionState::Submitting => "submitting",
            SessionState::Reconciling => "reconciling",
            SessionState::JobFailed => "job_failed",
            SessionState::SearchExhausted => "search_exhausted",
            SessionState::SearchCancelled => "search_cancelled",
            SessionState::SearchFailed => "search_failed",
            SessionState::SubmissionRejected => "submission_rejected",
            SessionState::SubmissionFailed => "submission_failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published state transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEvent {
    /// Cycle the transition belongs to; nil before the first cycle.
    pub cycle: Uuid,
    pub state: SessionState,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(cycle: Uuid, state: SessionState, message: impl Into<String>) -> Self {
        Self {
            cycle,
            state,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleReport {
    Mined {
        nonce: u64,
        hash: String,
        elapsed_secs: f64,
        chain_length: usize,
        blocks_mined: usize,
    },
    JobFailed {
        reason: String,
    },
    SearchExhausted {
        cap: u64,
    },
    SearchCancelled,
    SearchFailed {
        reason: String,
    },
    SubmissionRejected {
        reason: String,
    },
    SubmissionFailed {
        reason: String,
    },
}

impl CycleReport {
    /// The branch state visited before `Idle`, if any.
    pub fn branch(&self) -> Option<SessionState> {
        match self {
            CycleReport::Mined { .. } => None,
            CycleReport::JobFailed { .. } => Some(SessionState::JobFailed),
            CycleReport::SearchExhausted { .. } => Some(SessionState::SearchExhausted),
            CycleReport::SearchCancelled => Some(SessionState::SearchCancelled),
            CycleReport::SearchFailed { .. } => Some(SessionState::SearchFailed),
            CycleReport::SubmissionRejected { .. } => Some(SessionState::SubmissionRejected),
            CycleReport::SubmissionFailed { .. } => Some(SessionState::SubmissionFailed),
        }
    }

    pub fn is_mined(&self) -> bool {
        matches!(self, CycleReport::Mined { .. })
    }

    /// Status line shown to observers.
    pub fn summary(&self) -> String {
        match self {
            CycleReport::Mined {
                nonce,
                elapsed_secs,
                chain_length,
                ..
            } => format!(
                "block mined with nonce {nonce} in {elapsed_secs:.2}s, chain has {chain_length} blocks"
            ),
            CycleReport::JobFailed { reason } => format!("could not get a job: {reason}"),
            CycleReport::SearchExhausted { cap } => {
                format!("no solution up to nonce {cap} (timeout)")
            }
            CycleReport::SearchCancelled => "search cancelled".to_string(),
            CycleReport::SearchFailed { reason } => format!("search worker failed: {reason}"),
            CycleReport::SubmissionRejected { reason } => {
                format!("solution rejected, another miner was probably first: {reason}")
            }
            CycleReport::SubmissionFailed { reason } => format!("could not submit: {reason}"),
        }
    }
}
