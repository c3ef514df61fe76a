//! Helpers for binaries and examples.
pub mod logger;
