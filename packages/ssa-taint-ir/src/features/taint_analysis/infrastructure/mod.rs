pub mod library_summaries;
pub mod propagator;
pub mod referrer_index;
pub mod varargs;

pub use library_summaries::LibrarySummary;
pub use propagator::Propagator;
pub use referrer_index::ReferrerIndex;
pub use varargs::{find_backing_alloc, reconstruct_elements};
