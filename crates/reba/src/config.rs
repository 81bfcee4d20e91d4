//! JSON configuration for the engine and session.

use std::fs;
use std::path::Path;

use reba_score::{RebaIoError, RebaParams};
use serde::{Deserialize, Serialize};

use crate::session::SessionParams;

/// Top-level configuration file.
///
/// Every field has a default, so `{}` or a file naming only the fields to
/// change is valid.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RebaConfig {
    pub engine: RebaParams,
    pub session: SessionParams,
}

impl RebaConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RebaIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RebaIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
