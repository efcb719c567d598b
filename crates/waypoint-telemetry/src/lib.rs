//! Logging for Waypoint.
//!
//! Every Waypoint crate reports through [`tracing`]. This crate installs the
//! subscriber and provides the two adapters the framework needs on top:
//!
//! - [`Category`] and [`log`] tag events as `MESSAGE`, `WARNING`, `ERROR` or a
//!   subsystem name, carried in the `category` field.
//! - [`LogWriter`] turns anything that writes bytes into log events, one per
//!   line. The listeners use it as the error sink for connection tasks.
//!
//! # Example
//!
//! ```rust,ignore
//! use waypoint_telemetry::{init_logging, log, Category, LogConfig};
//!
//! init_logging(&LogConfig::for_mode(true))?;
//! log(Category::Tagged("SWAGGER"), "documentation mounted at /swagger/");
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod category;
pub mod error;
pub mod logging;
pub mod writer;

pub use category::{log, Category};
pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};
pub use writer::LogWriter;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
