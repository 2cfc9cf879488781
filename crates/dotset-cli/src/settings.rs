//! Layered settings: defaults, then an optional YAML file, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dotset::NumberFormat;
use serde::Deserialize;

use crate::input::{EnvReader, InputFormat};
use crate::output::OutputMode;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "DOTSET_CONFIG";

/// Effective settings for one run.
///
/// ```yaml
/// number:
///   decimal_separator: ","
///   thousands_separator: "."
/// output: yaml
/// input: auto
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub number: NumberFormat,
    pub output: OutputMode,
    pub input: InputFormat,
}

/// Values given on the command line. `None` keeps the settings value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub input: Option<InputFormat>,
    pub output: Option<OutputMode>,
    pub decimal: Option<char>,
    pub thousands: Option<char>,
}

impl Settings {
    /// Loads settings from `path`, or from the file named by
    /// [`CONFIG_ENV`], or returns the defaults when neither is set.
    pub fn load(path: Option<&Path>, env: &dyn EnvReader) -> Result<Settings> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env.var(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from));
        let Some(path) = path else {
            return Ok(Settings::default());
        };

        tracing::debug!(path = %path.display(), "loading settings");
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Settings::from_yaml(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Parses settings from YAML text. Empty text yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Settings> {
        if text.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies command-line overrides on top of these settings.
    pub fn apply(mut self, overrides: Overrides) -> Settings {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(decimal) = overrides.decimal {
            self.number.decimal_separator = decimal;
        }
        if let Some(thousands) = overrides.thousands {
            self.number.thousands_separator = Some(thousands);
        }
        self
    }
}
