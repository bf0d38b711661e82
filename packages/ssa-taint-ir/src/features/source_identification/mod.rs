//! Source identification **[EXPANSION]**: the default `source_map`
//! producer. §3 treats `source_map : Function -> [SourceSite]` as an input
//! "produced by external collaborators"; this module is the crate's own
//! such collaborator, built directly against the `SourcePredicates` port so
//! the engine runs end to end without requiring a caller to supply one.

pub mod infrastructure;

pub use infrastructure::{identify_sources, SourceSite};
