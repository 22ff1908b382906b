//! System-level modules
//!
//! - Logging initialisation
//! - Shutdown signal handling

pub mod logging;
pub mod signal;
