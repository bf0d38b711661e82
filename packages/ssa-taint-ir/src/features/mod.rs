//! Feature modules, each a hexagonal vertical slice:
//! - `domain/`         — pure types, no external dependencies
//! - `ports/`           — traits describing what's supplied externally
//! - `application/`     — use-cases built from the domain
//! - `infrastructure/`  — concrete walking/solving code
//!
//! `points_to` and `taint_analysis` are the two coupled core analyses
//! (§4.C1-C6, C9); `type_inference` and `source_identification` are the
//! supplemented default passes that give the crate a runnable entry point.

pub mod points_to;
pub mod source_identification;
pub mod taint_analysis;
pub mod type_inference;
