// AIMesh tools - Shared Library
// Logging, configuration and binary buffer plumbing used by the converters

pub mod config;
pub mod log;
pub mod util;

/// Default console log level (matches `--log-level` scale, 2 = Detail)
pub const DEFAULT_LOG_LEVEL: i32 = 2;
