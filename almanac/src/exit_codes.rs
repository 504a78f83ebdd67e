//! Stable exit codes for almanac CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid invocation, config or stem-branch code.
pub const INVALID: i32 = 1;
/// `almanac process` produced a failure result (status 400).
pub const FAILED: i32 = 2;
