pub mod cancel;
pub mod hash;
pub mod search;

pub use cancel::CancelToken;
pub use hash::{NonceHasher, digest, meets_target};
pub use search::{MiningOutcome, NonceSearcher};
