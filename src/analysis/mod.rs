//! Pure aggregation, recommendation and ranking over daily records.
//!
//! None of these functions touch the network or the store; callers fetch
//! and sort records first.

pub mod aggregator;
pub mod recommendation;
pub mod ranking;

pub use aggregator::summarize;
pub use recommendation::summarize_with_recommendation;
pub use ranking::rank_top;

/// Volumes are reported in millions of shares
pub const VOLUME_SCALE: u64 = 1_000_000;
