//! Logging setup for PufferPanel binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat};
