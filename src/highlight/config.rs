//! Configuration
//!
//! The documented defaults in `defaults/hilite.default.toml` are compiled in and always
//! form the bottom layer, so a config file only lists what it changes. [`HighlightConfig`]
//! maps onto the per-call [`HighlightOptions`] and [`AutoOptions`].

use super::highlighter::{AutoOptions, HighlightOptions, Illegals};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/hilite.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HighlightConfig {
    pub output: OutputConfig,
    pub detection: DetectionConfig,
    pub illegals: IllegalsConfig,
    pub languages: LanguagesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionConfig {
    /// Empty means every registered language
    #[serde(default)]
    pub subset: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IllegalsConfig {
    pub policy: Illegals,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguagesConfig {
    pub bundled: bool,
}

impl HighlightConfig {
    pub fn highlight_options(&self) -> HighlightOptions {
        HighlightOptions {
            prefix: self.output.prefix.clone(),
            illegals: self.illegals.policy,
        }
    }

    pub fn auto_options(&self) -> AutoOptions {
        AutoOptions {
            prefix: self.output.prefix.clone(),
            subset: if self.detection.subset.is_empty() {
                None
            } else {
                Some(self.detection.subset.clone())
            },
        }
    }
}

/// Builds a [`HighlightConfig`] from layered sources. Later layers win: the embedded
/// defaults, then files and environment variables in the order they were added, then
/// single-key overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Loader {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file; building fails if it does not exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), true)
    }

    /// Layer a TOML file that may be absent, such as a per-user file.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), false)
    }

    /// Layer `<PREFIX>_<SECTION>__<KEY>` variables (`HILITE_OUTPUT__PREFIX=x-`).
    pub fn with_environment(mut self, prefix: &str) -> Self {
        let source = Environment::with_prefix(prefix)
            .prefix_separator("_")
            .separator("__");
        self.builder = self.builder.add_source(source);
        self
    }

    /// Set one dotted key (`"output.prefix"`, `"illegals.policy"`) above every layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<HighlightConfig, ConfigError> {
        let config: HighlightConfig = self.builder.build()?.try_deserialize()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn layer_file(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<HighlightConfig, ConfigError> {
    Loader::new().build()
}
