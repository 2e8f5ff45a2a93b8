//! Construction policy
//!
//! A [`ModelConfig`] decides which groups of checks `build()` runs. It is
//! carried by a [`crate::Schema`], inherited by the builders the schema hands
//! out, and remembered by every node so `to_builder().build()` runs under the
//! same policy.
//!
//! ```rust
//! use ferrum_model::{ModelConfig, Preset};
//!
//! let cfg = ModelConfig::builder()
//!     .preset(Preset::Strict)
//!     .check_leaf_values(false)
//!     .build();
//! assert!(cfg.check_reference_literals);
//!
//! let yaml = cfg.to_yaml()?;
//! assert_eq!(ModelConfig::from_yaml(&yaml)?, cfg);
//! # Ok::<(), ferrum_model::Error>(())
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Named starting points for a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Hint checks and leaf checks on, locator parsing off
    Default,
    /// Everything on, including reference locator parsing
    Strict,
    /// No reference, literal or leaf checks
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Run schema checks in `build()`. Null list entries, extension kinds and
    /// single/repeated shape are checked regardless.
    pub validating: bool,
    /// Check `Reference.type` hints against the field's allow-list.
    pub check_reference_types: bool,
    /// Also parse `Reference.reference` locators (`Type/id`, `Type?query`)
    /// and check the type they name.
    pub check_reference_literals: bool,
    /// Check the lexical form of leaf values.
    pub check_leaf_values: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::preset(Preset::Default)
    }
}

impl ModelConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self {
                validating: true,
                check_reference_types: true,
                check_reference_literals: false,
                check_leaf_values: true,
            },
            Preset::Strict => Self {
                validating: true,
                check_reference_types: true,
                check_reference_literals: true,
                check_leaf_values: true,
            },
            Preset::Lenient => Self {
                validating: true,
                check_reference_types: false,
                check_reference_literals: false,
                check_leaf_values: false,
            },
        }
    }

    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    pub fn preset(mut self, preset: Preset) -> Self {
        self.config = ModelConfig::preset(preset);
        self
    }

    pub fn validating(mut self, validating: bool) -> Self {
        self.config.validating = validating;
        self
    }

    pub fn check_reference_types(mut self, check: bool) -> Self {
        self.config.check_reference_types = check;
        self
    }

    pub fn check_reference_literals(mut self, check: bool) -> Self {
        self.config.check_reference_literals = check;
        self
    }

    pub fn check_leaf_values(mut self, check: bool) -> Self {
        self.config.check_leaf_values = check;
        self
    }

    pub fn build(self) -> ModelConfig {
        self.config
    }
}
