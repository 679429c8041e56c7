//! Shared utilities for the payd SPV tools.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
