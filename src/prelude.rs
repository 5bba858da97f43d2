//! Convenience re-exports for easy importing
//!
//! Import everything you need with:
//! ```rust
//! use bodylog_actix::prelude::*;
//! ```

pub use crate::config::Config;
pub use crate::error::LogError;
pub use crate::identity::{LogContext, Principal};
pub use crate::middleware::RequestLogger;
pub use crate::sink::{LogSink, TracingSink};
