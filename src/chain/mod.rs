pub mod block;
pub mod canonical;
pub mod snapshot;
pub mod sync;

pub use block::{Block, Transaction};
pub use snapshot::ChainSnapshot;
pub use sync::ChainSync;
