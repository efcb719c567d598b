//! Configuration for the Waypoint router.
//!
//! Two flags drive the router at runtime:
//!
//! - `dev`: development mode
//! - `trace_request`: log every inbound request with its resolved route
//!
//! Both default to `false`. They can come from an optional TOML file, a
//! `.env` file, or the process environment (`WAYPOINT_DEV`,
//! `WAYPOINT_TRACE_REQUEST`), later sources overriding earlier ones.
//! Booleans are parsed case-insensitively; values that do not parse are
//! ignored.
//!
//! # Example
//!
//! ```
//! use waypoint_config::{ConfigLoader, WaypointConfig};
//!
//! let config = ConfigLoader::new()
//!     .load_from_vars([("WAYPOINT_TRACE_REQUEST", "TRUE")]);
//!
//! assert_eq!(config, WaypointConfig::new().trace_request(true));
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! dev = false
//! trace_request = true
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::WaypointConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::{parse_bool, ConfigLoader, DEFAULT_ENV_FILE, DEFAULT_ENV_PREFIX};
