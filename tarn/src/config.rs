//! Interpreter configuration
//!
//! Read from TOML:
//!
//! ```toml
//! max_call_depth = 10000
//! display_capacity = 64
//!
//! [flags]
//! mode = "fast"
//! ```

use crate::error::{Result, TarnError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default limit on live calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;
/// Default number of lexical nesting levels
pub const DEFAULT_DISPLAY_CAPACITY: usize = 64;
/// 128KB remaining triggers stack growth
pub const DEFAULT_STACK_RED_ZONE: usize = 128 * 1024;
/// Grow by 4MB each time
pub const DEFAULT_STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_call_depth: usize,
    pub display_capacity: usize,
    pub stack_red_zone: usize,
    pub stack_grow_size: usize,
    /// Program flags readable through `flag(name)`
    pub flags: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            display_capacity: DEFAULT_DISPLAY_CAPACITY,
            stack_red_zone: DEFAULT_STACK_RED_ZONE,
            stack_grow_size: DEFAULT_STACK_GROW_SIZE,
            flags: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Set flags from `key=value` strings, overriding existing entries
    pub fn apply_flags<'a>(&mut self, entries: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for entry in entries {
            let (key, value) = entry
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| TarnError::InvalidFlag(entry.to_string()))?;
            self.flags.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
