//! Input resolution and decoding.
//!
//! An [`Input`] names where bytes come from and how to read them. Base64 is
//! stripped from the raw stream first; the binary or JSON decode runs on the
//! result.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use configtx_core::codec;
use configtx_core::{CoreError, DecodeStage, DynMessage, MessageType, WireMessage};
use tracing::debug;

use crate::error::{CodecError, Result};

/// Where input bytes come from.
#[derive(Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file on disk.
    File(PathBuf),
    /// The process's standard input.
    Stdin,
    /// Bytes already in memory, e.g. an HTTP form field.
    Bytes(Vec<u8>),
}

impl InputSource {
    /// Pick the source for an optional path.
    ///
    /// An explicit path wins; otherwise stdin when the command allows it.
    pub fn resolve(path: Option<PathBuf>, allow_stdin: bool, what: &str) -> Result<Self> {
        match path {
            Some(path) => Ok(InputSource::File(path)),
            None if allow_stdin => Ok(InputSource::Stdin),
            None => Err(CodecError::InputUnavailable(format!(
                "no {} given and stdin is not accepted here",
                what
            ))),
        }
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        match self {
            InputSource::File(path) => std::fs::read(path).map_err(|source| CodecError::Read {
                source_name: path.display().to_string(),
                source,
            }),
            InputSource::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|source| CodecError::Read {
                        source_name: "stdin".into(),
                        source,
                    })?;
                Ok(buf)
            }
            InputSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "File({})", path.display()),
            InputSource::Stdin => f.write_str("Stdin"),
            InputSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// A resolved input plus its format flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    source: InputSource,
    base64: bool,
    json: bool,
}

impl Input {
    /// Read from the given source as raw protobuf binary.
    pub fn new(source: InputSource) -> Self {
        Self {
            source,
            base64: false,
            json: false,
        }
    }

    /// Read from a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(InputSource::File(path.into()))
    }

    /// Read from bytes in memory.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(InputSource::Bytes(bytes.into()))
    }

    /// Resolve an optional path, falling back to stdin when allowed.
    pub fn resolve(path: Option<PathBuf>, allow_stdin: bool, what: &str) -> Result<Self> {
        InputSource::resolve(path, allow_stdin, what).map(Self::new)
    }

    /// Strip a base64 wrapper before decoding.
    pub fn with_base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    /// Decode the JSON projection instead of binary.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Where this input reads from.
    pub fn source(&self) -> &InputSource {
        &self.source
    }

    /// Read the stream and remove the base64 wrapper, if any.
    pub fn read_raw(&self) -> Result<Vec<u8>> {
        let raw = self.source.read_all()?;
        if !self.base64 {
            return Ok(raw);
        }

        let compact: Vec<u8> = raw
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        STANDARD.decode(&compact).map_err(|e| {
            CodecError::Core(CoreError::Decode {
                stage: DecodeStage::Base64,
                message: e.to_string(),
            })
        })
    }

    /// Read and decode a message of a statically known type.
    pub fn decode<M: WireMessage>(&self) -> Result<M> {
        let raw = self.read_raw()?;
        debug!(source = ?self.source, json = self.json, len = raw.len(), "decoding input");
        let message = if self.json {
            codec::from_json(&raw)?
        } else {
            codec::decode_binary(&raw)?
        };
        Ok(message)
    }

    /// Read and decode a message of a type chosen at runtime.
    pub fn decode_dyn(&self, message_type: &MessageType) -> Result<Box<dyn DynMessage>> {
        let raw = self.read_raw()?;
        debug!(
            source = ?self.source,
            message = message_type.name(),
            json = self.json,
            len = raw.len(),
            "decoding input"
        );
        Ok(message_type.decode(&raw, self.json)?)
    }
}
