pub mod machine;
pub mod status;

pub use machine::MiningSession;
pub use status::{CycleReport, SessionState, StatusEvent};
