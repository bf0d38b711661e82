//! Taint propagation (§4.C6) and varargs reconstruction (§4.C9).

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{Sanitizer, TaintSummary};
pub use infrastructure::{LibrarySummary, Propagator, ReferrerIndex};
