//! Generator configuration.
//!
//! Configuration is optional. It is loaded from a camelCase JSON document
//! and every field has a default, so `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::GeneratorError;

/// Options that change what the generator emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Type optional inlined body properties as `core::Optional<T>` so callers
    /// can send an explicit `null`, and emit the `optional` helper module.
    pub include_generic_optionals: bool,

    /// Value of the SDK-name platform header. Defaults to the API name.
    pub sdk_name: Option<String>,

    /// Value of the SDK-version platform header. Platform headers are only
    /// sent when this is set.
    pub sdk_version: Option<String>,
}

impl GeneratorConfig {
    /// Loads a configuration file.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::Config` if the file cannot be read and
    /// `GeneratorError::Parse` if it is not a valid configuration document.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, GeneratorError> {
        serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("invalid generator config: {}", e)))
    }
}
