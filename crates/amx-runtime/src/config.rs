//! Runtime options (amx.toml)
//!
//! ```toml
//! policy = "require-all-natives-bound"
//! libraries = ["core", "fixed"]
//! ```

use crate::error::RuntimeError;
use crate::library_by_name;
use amx_engine::{BaseInitializer, InitPolicy, Initializer};
use amx_stdlib::{CORE_LIBRARY, FIXED_LIBRARY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Which libraries to install and how their failures count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeOptions {
    /// Aggregate status policy
    #[serde(default)]
    pub policy: InitPolicy,

    /// Libraries to install, in order (default: core, fixed)
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
}

fn default_libraries() -> Vec<String> {
    vec![CORE_LIBRARY.to_string(), FIXED_LIBRARY.to_string()]
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            policy: InitPolicy::default(),
            libraries: default_libraries(),
        }
    }
}

impl RuntimeOptions {
    /// Parse options from a file
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        debug!(path = %path.display(), "loading runtime options");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a string
    pub fn from_toml_str(content: &str) -> Result<Self, RuntimeError> {
        let options: RuntimeOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Check library names
    pub fn validate(&self) -> Result<(), RuntimeError> {
        for (i, name) in self.libraries.iter().enumerate() {
            if library_by_name(name).is_none() {
                return Err(RuntimeError::UnknownLibrary(name.clone()));
            }
            if self.libraries[..i].contains(name) {
                return Err(RuntimeError::DuplicateLibrary(name.clone()));
            }
        }
        Ok(())
    }

    /// Build the initializer these options describe
    pub fn build_initializer(&self) -> Result<Initializer, RuntimeError> {
        let mut initializer = Initializer::new(BaseInitializer).with_policy(self.policy);
        for name in &self.libraries {
            let library =
                library_by_name(name).ok_or_else(|| RuntimeError::UnknownLibrary(name.clone()))?;
            if initializer.library_names().contains(&name.as_str()) {
                return Err(RuntimeError::DuplicateLibrary(name.clone()));
            }
            initializer = initializer.with_library(library);
        }
        debug!(
            policy = ?self.policy,
            libraries = ?initializer.library_names(),
            "initializer configured"
        );
        Ok(initializer)
    }
}
