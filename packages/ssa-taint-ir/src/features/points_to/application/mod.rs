pub mod queries;

pub use queries::Queries;
