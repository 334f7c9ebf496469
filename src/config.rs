//! # Configuration Module
//!
//! Binding configuration loaded from environment variables.
//!
//! ## Environment Variables
//!
//! ### `BRRTBIND_REQUIRED_BY_DEFAULT`
//!
//! Whether fields without an `optional`/`required` option are required.
//! Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
//!
//! Default: `true`
//!
//! ### `BRRTBIND_MAX_MULTIPART_BYTES`
//!
//! Largest `multipart/form-data` body the extractor will parse in memory.
//! Accepts decimal (`20971520`) or hexadecimal (`0x1400000`).
//!
//! Default: 20 MiB
//!
//! ## Lifecycle
//!
//! Load once at startup and hand the value to [`crate::Binder::new`]. The
//! binder copies it; changing the environment afterwards has no effect on
//! bindings already configured, and there is no global to mutate.
//!
//! ```rust
//! use brrtbind::{BindConfig, Binder};
//!
//! let config = BindConfig::from_env();
//! let binder = Binder::new(config);
//! assert_eq!(binder.config().max_multipart_bytes, config.max_multipart_bytes);
//! ```

use std::env;

/// Default in-memory limit for multipart bodies (20 MiB).
pub const DEFAULT_MAX_MULTIPART_BYTES: usize = 20 << 20;

pub const ENV_REQUIRED_BY_DEFAULT: &str = "BRRTBIND_REQUIRED_BY_DEFAULT";
pub const ENV_MAX_MULTIPART_BYTES: &str = "BRRTBIND_MAX_MULTIPART_BYTES";

/// Settings shared by the binder and the parameter extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindConfig {
    /// Fields are required unless tagged `optional` (default: true)
    pub required_by_default: bool,
    /// Max multipart body size in bytes (default: 20 MiB)
    pub max_multipart_bytes: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        BindConfig {
            required_by_default: true,
            max_multipart_bytes: DEFAULT_MAX_MULTIPART_BYTES,
        }
    }
}

impl BindConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Unparseable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BindConfig::default();
        let required_by_default = lookup(ENV_REQUIRED_BY_DEFAULT)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.required_by_default);
        let max_multipart_bytes = lookup(ENV_MAX_MULTIPART_BYTES)
            .and_then(|v| parse_size(&v))
            .unwrap_or(defaults.max_multipart_bytes);
        BindConfig {
            required_by_default,
            max_multipart_bytes,
        }
    }

    #[must_use]
    pub fn with_required_by_default(mut self, required: bool) -> Self {
        self.required_by_default = required;
        self
    }

    #[must_use]
    pub fn with_max_multipart_bytes(mut self, bytes: usize) -> Self {
        self.max_multipart_bytes = bytes;
        self
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
