//! Almanac field pipeline.
//!
//! Reduces a nested third-party almanac record to a configured set of fields,
//! derives the day's void branches from the sexagenary cycle, renames fields
//! to display labels, and renders the result for chat. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (filtering, cycle arithmetic,
//!   translation, rendering). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, upstream fetch).
//!   Isolated behind traits so tests can script them.
//!
//! [`pipeline`] coordinates core logic with I/O and converts every failure into
//! a uniform [`core::types::PipelineResult`].

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
