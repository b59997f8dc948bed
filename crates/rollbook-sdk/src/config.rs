use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rollbook_store::Validation;

use crate::error::{SdkError, SdkResult};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ROLLBOOK_CONFIG";

/// Default location of the file backend's workbook.
pub const DEFAULT_WORKBOOK_PATH: &str = "rollbook.json";

/// Where the workbook lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local workbook, discarded on exit.
    Memory,
    /// JSON workbook document on disk.
    File { path: PathBuf },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
        }
    }
}

/// Startup configuration.
///
/// `workbook_id` and `credentials` are opaque: they are handed to the
/// backend untouched and never validated or logged in full.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolConfig {
    pub workbook_id: Option<String>,
    pub credentials: Option<String>,
    pub validation: Validation,
    pub backend: BackendConfig,
}

impl SchoolConfig {
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}
