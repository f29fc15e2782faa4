//! Output resolution and encoding.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use configtx_core::{codec, DynMessage, WireMessage};
use tracing::{debug, warn};

use crate::error::{CodecError, Result};

/// Where output bytes go.
#[derive(Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// A file, created or truncated on write.
    File(PathBuf),
    /// The process's standard output.
    Stdout,
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSink::File(path) => write!(f, "File({})", path.display()),
            OutputSink::Stdout => f.write_str("Stdout"),
        }
    }
}

/// A resolved output plus its format flag.
///
/// An output without a sink renders nothing and logs a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    sink: Option<OutputSink>,
    json: bool,
}

impl Output {
    /// Write to the given sink, or nowhere.
    pub fn new(sink: Option<OutputSink>) -> Self {
        Self { sink, json: false }
    }

    /// Write to a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Some(OutputSink::File(path.into())))
    }

    /// Resolve an optional path, falling back to stdout when allowed.
    pub fn resolve(path: Option<PathBuf>, allow_stdout: bool) -> Self {
        let sink = match path {
            Some(path) => Some(OutputSink::File(path)),
            None if allow_stdout => Some(OutputSink::Stdout),
            None => None,
        };
        Self::new(sink)
    }

    /// Encode the JSON projection instead of binary.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Whether this output encodes JSON.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Where this output writes to.
    pub fn sink(&self) -> Option<&OutputSink> {
        self.sink.as_ref()
    }

    /// Encode a message in this output's format without writing it.
    pub fn render<M: WireMessage>(&self, message: &M) -> Result<Vec<u8>> {
        if self.json {
            Ok(codec::to_json(message)?)
        } else {
            Ok(codec::encode_binary(message))
        }
    }

    /// Encode a runtime-typed message in this output's format.
    pub fn render_dyn(&self, message: &dyn DynMessage) -> Result<Vec<u8>> {
        if self.json {
            Ok(message.to_json()?)
        } else {
            Ok(message.encode_binary())
        }
    }

    /// Encode and write a message.
    pub fn emit<M: WireMessage>(&self, message: &M) -> Result<()> {
        let bytes = self.render(message)?;
        self.write_bytes(&bytes)
    }

    /// Encode and write a runtime-typed message.
    pub fn emit_dyn(&self, message: &dyn DynMessage) -> Result<()> {
        let bytes = self.render_dyn(message)?;
        self.write_bytes(&bytes)
    }

    /// Write already-encoded bytes to the sink.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        match &self.sink {
            None => {
                warn!("no output file specified, result discarded");
                Ok(())
            }
            Some(OutputSink::File(path)) => {
                debug!(path = %path.display(), len = bytes.len(), "writing output");
                std::fs::write(path, bytes).map_err(|source| CodecError::Write {
                    path: path.clone(),
                    source,
                })
            }
            Some(OutputSink::Stdout) => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(bytes)
                    .and_then(|()| stdout.flush())
                    .map_err(|source| CodecError::Write {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })
            }
        }
    }
}
