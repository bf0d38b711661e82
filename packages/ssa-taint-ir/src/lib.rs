//! ssa-taint-ir — a static taint-analysis core over an SSA intermediate
//! representation (§1).
//!
//! The two coupled analyses at the heart of the crate:
//!
//! - [`features::points_to`] — the EAR (Equivalent Abstract References)
//!   field-sensitive, unification-based may-alias analysis (§4.C1-C5).
//! - [`features::taint_analysis`] — the depth-first def-use/operand taint
//!   propagator, flow-sensitive pruning, sanitizer dominance (§4.C6, C9).
//!
//! [`features::type_inference`] (§4.C8) and [`features::source_identification`]
//! are the supplemented passes that give [`driver::analyze`] a runnable
//! entry point without requiring a caller to hand-build a source map.
//! [`ssa`] is the input IR this crate consumes but never constructs (§3).
//! [`config`] compiles the §6 option table into the predicate objects the
//! rest of the crate consumes as ports.

pub mod config;
pub mod driver;
pub mod errors;
pub mod features;
pub mod ssa;

pub use config::{AnalysisConfig, ConfigError, FieldTag, RawConfig};
pub use driver::{analyze, Diagnostic};
pub use errors::{AnalysisError, Result};
