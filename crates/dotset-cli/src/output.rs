//! Where results go and in which shape.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Shape of the rendered result, set by `--output` or the `output` key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Text on a terminal, JSON when piped
    #[default]
    Auto,
    /// Plain lines, scalars unquoted
    Text,
    Json,
    Yaml,
    Csv,
}

impl OutputMode {
    /// JSON, YAML and CSV are encodings of the data itself.
    pub fn is_structured(self) -> bool {
        !matches!(self, OutputMode::Auto | OutputMode::Text)
    }

    /// Settles `Auto` against the real stdout.
    pub fn resolve_auto(self) -> OutputMode {
        self.resolve_with(atty::is(atty::Stream::Stdout))
    }

    pub(crate) fn resolve_with(self, interactive: bool) -> OutputMode {
        match (self, interactive) {
            (OutputMode::Auto, true) => OutputMode::Text,
            (OutputMode::Auto, false) => OutputMode::Json,
            (mode, _) => mode,
        }
    }
}

/// Target of the rendered text: stdout, or the file given by `--out`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputDestination {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => OutputDestination::File(path),
            None => OutputDestination::Stdout,
        }
    }

    /// Writes `text` terminated by exactly one newline.
    ///
    /// A file target is created or truncated. Its directory must exist.
    pub fn write_text(&self, text: &str) -> io::Result<()> {
        let body = text.strip_suffix('\n').unwrap_or(text);
        match self {
            OutputDestination::Stdout => write_line(io::stdout().lock(), body),
            OutputDestination::File(path) => {
                require_parent(path)?;
                write_line(BufWriter::new(File::create(path)?), body)
            }
        }
    }
}

fn write_line(mut sink: impl Write, body: &str) -> io::Result<()> {
    sink.write_all(body.as_bytes())?;
    sink.write_all(b"\n")?;
    sink.flush()
}

fn require_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("output directory {} does not exist", dir.display()),
        )),
        _ => Ok(()),
    }
}
