//! Reading the input document.
//!
//! The document comes from a file or from piped stdin and is decoded as
//! JSON or YAML. OS access goes through [`StdinReader`] and [`EnvReader`] so
//! tests can run without a terminal or a real environment.

use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use dotset::Value;
use serde::Deserialize;

/// Decoding of the input document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Pick by file extension, otherwise try JSON then YAML
    #[default]
    Auto,
    Json,
    Yaml,
}

impl InputFormat {
    /// Resolves Auto by file extension. Unknown extensions stay Auto.
    pub fn for_file(self, path: Option<&Path>) -> InputFormat {
        if self != InputFormat::Auto {
            return self;
        }
        match path
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            Some("yaml" | "yml") => InputFormat::Yaml,
            _ => InputFormat::Auto,
        }
    }
}

/// Standard input as seen by [`read_document`].
pub trait StdinReader {
    /// `true` when a person is typing, `false` when a document is piped in.
    fn is_terminal(&self) -> bool;

    fn read_all(&self) -> io::Result<String>;
}

/// Process environment lookups.
pub trait EnvReader {
    fn var(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealStdin;

impl StdinReader for RealStdin {
    fn is_terminal(&self) -> bool {
        atty::is(atty::Stream::Stdin)
    }

    fn read_all(&self) -> io::Result<String> {
        let mut text = String::new();
        io::stdin().lock().read_to_string(&mut text)?;
        Ok(text)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).and_then(|v| v.into_string().ok())
    }
}

/// Reads and decodes the document from `file`, or from stdin when absent.
pub fn read_document(
    file: Option<&Path>,
    format: InputFormat,
    stdin: &dyn StdinReader,
) -> Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            if stdin.is_terminal() {
                bail!("no input: pass a FILE or pipe a document on stdin");
            }
            stdin.read_all().context("failed to read stdin")?
        }
    };
    let source = file.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    decode(&text, format.for_file(file)).with_context(|| format!("failed to parse {}", source))
}

/// Decodes `text` in the given format.
pub fn decode(text: &str, format: InputFormat) -> Result<Value> {
    match format {
        InputFormat::Json => Ok(serde_json::from_str(text)?),
        InputFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        InputFormat::Auto => match serde_json::from_str::<Value>(text) {
            Ok(value) => Ok(value),
            Err(json_err) => {
                tracing::debug!(error = %json_err, "input is not JSON, trying YAML");
                Ok(serde_yaml::from_str(text)?)
            }
        },
    }
}
