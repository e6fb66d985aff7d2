//! Engine configuration.
//!
//! Configuration is a YAML document; every field is optional:
//!
//! ```yaml
//! load_path: [lib, vendor/macros]
//! keep_expanded: true
//! expanded_prefix: macroexpanded_
//! extension: rb
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{err_msg, SpliceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directories searched, in order, by `require_with_macro`.
    pub load_path: Vec<PathBuf>,
    /// Leave `<prefix><file>` on disk after loading it.
    pub keep_expanded: bool,
    pub expanded_prefix: String,
    /// Source file extension, without the dot.
    pub extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            load_path: vec![PathBuf::from(".")],
            keep_expanded: false,
            expanded_prefix: "macroexpanded_".to_string(),
            extension: "rb".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, SpliceError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| err_msg!(Config, "invalid configuration: {}", e).with_cause(e))
    }

    pub fn load(path: &Path) -> Result<Self, SpliceError> {
        let text = fs::read_to_string(path).map_err(|e| SpliceError::io("read", path, e))?;
        let config = Self::from_yaml_str(&text)
            .map_err(|e| e.with_help(format!("while reading {}", path.display())))?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Appends the configured extension to `name` unless it already has one.
    pub fn source_file_name(&self, name: &str) -> String {
        if Path::new(name).extension().is_some() || self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.extension)
        }
    }
}
