//! # Runtime Configuration Module
//!
//! Environment-driven settings for the coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `FLAPI_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts decimal (`16384`) or hexadecimal
//! (`0x4000`). Default: `0x4000` (16 KB). Unparseable values fall back to the
//! default.
//!
//! ```bash
//! export FLAPI_STACK_SIZE=0x8000
//! flapi serve --config flapi.yaml
//! ```

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let stack_size = env::var("FLAPI_STACK_SIZE")
            .ok()
            .and_then(|v| parse_stack_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` configuration. Call before starting the server.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_stack_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
