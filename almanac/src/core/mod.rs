//! Deterministic, pure transformations behind the almanac pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! records and return deterministic outputs suitable for tests.

pub mod context;
pub mod render;
pub mod schema;
pub mod sexagenary;
pub mod translate;
pub mod types;
