//! Field/type inference (§4.C8): a depends-on graph over every named type
//! the program declares, used to propagate the "inferred source" fact from
//! a configured source type or source-matching field forward onto every
//! type that embeds it, directly or transitively.

pub mod infrastructure;

pub use infrastructure::TypeDependencyGraph;
