//! vmc-osc/src/config.rs
//!
//! Connection settings for a VMC sender, loadable from a JSON file.
//!
//! ```json
//! { "host": "localhost", "port": 39539, "name": "example", "delta_offset": 0.0 }
//! ```
//! Every field is optional and falls back to its default.

use crate::{Result, VmcError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Port VMC receivers listen on unless told otherwise.
pub const DEFAULT_PORT: u16 = 39539;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmcConfig {
    pub host: String,
    pub port: u16,
    /// Client name, used in logs.
    pub name: String,
    /// Seconds added to every relative time, to continue an earlier session.
    pub delta_offset: f64,
    /// Decimal digits kept when building rotations.
    pub precision: u32,
}

impl Default for VmcConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            name: "example".to_string(),
            delta_offset: 0.0,
            precision: 12,
        }
    }
}

impl VmcConfig {
    /// Reads a JSON config file. A leading UTF-8 BOM is tolerated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();

        let bytes = fs::read(p)
            .map_err(|e| VmcError::Config(format!("Could not read file {}: {e}", p.display())))?;

        if bytes.is_empty() {
            return Err(VmcError::Config(format!("File is empty: {}", p.display())));
        }

        let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        if content.len() != bytes.len() {
            tracing::debug!("BOM detected in {}, removing for parsing", p.display());
        }

        serde_json::from_slice::<VmcConfig>(content).map_err(|e| {
            tracing::error!("JSON parse error for {}: {}", p.display(), e);
            VmcError::Config(format!("JSON parse error: {e}"))
        })
    }

    /// `host:port`, for logs.
    pub fn destination(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
