//! Router configuration values.

use serde::{Deserialize, Serialize};

/// Process-wide router flags.
///
/// Built once at startup (usually through [`ConfigLoader`](crate::ConfigLoader))
/// and handed to the router explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaypointConfig {
    /// Development mode.
    pub dev: bool,
    /// Log every inbound request with its resolved route.
    pub trace_request: bool,
}

impl WaypointConfig {
    /// Configuration with every flag off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dev: false,
            trace_request: false,
        }
    }

    /// Development preset: dev mode and request tracing on.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            dev: true,
            trace_request: true,
        }
    }

    /// Sets development mode.
    #[must_use]
    pub const fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// Sets request tracing.
    #[must_use]
    pub const fn trace_request(mut self, trace: bool) -> Self {
        self.trace_request = trace;
        self
    }
}
