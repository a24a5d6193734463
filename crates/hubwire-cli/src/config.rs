//! hubwire.toml configuration.
//!
//! All fields are optional; command-line flags override file values, and
//! anything left unset falls back to the defaults in the subcommands.
//!
//! ```toml
//! source = "src"
//! output = "generated"
//! emit_capability_interfaces = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name probed in the working directory when no --config is given.
pub const DEFAULT_CONFIG_FILE: &str = "hubwire.toml";

/// Parsed hubwire.toml contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubwireConfig {
    /// Directory scanned for contracts and proxy declarations.
    pub source: Option<PathBuf>,

    /// Directory generated artifacts are written to.
    pub output: Option<PathBuf>,

    /// Emit capability traits implemented by the role types.
    #[serde(default)]
    pub emit_capability_interfaces: bool,
}

impl HubwireConfig {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Load the explicit path when given, otherwise the default file if it
    /// exists, otherwise built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
