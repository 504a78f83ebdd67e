//! I/O helpers for the almanac pipeline: configuration and upstream fetch.

pub mod config;
pub mod fetch;
