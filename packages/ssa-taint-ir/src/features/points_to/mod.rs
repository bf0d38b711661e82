//! EAR (Equivalent Abstract References) pointer analysis (§4.C1-C5).

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::Queries;
pub use domain::{Context, Field, HeapState, Partitions, Reference, ReferenceFactory, SyntheticKind};
pub use infrastructure::Transformer;
