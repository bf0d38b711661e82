pub mod heap;
pub mod partitions;
pub mod reference;

pub use heap::{FieldMap, HeapState};
pub use partitions::Partitions;
pub use reference::{Context, Field, Reference, ReferenceFactory, SyntheticKind};
