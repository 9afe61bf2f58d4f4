//! Utility modules
//!
//! - **error**: fatal error type for a run
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{ConformError, Result};
pub use logging::init_tracing;
