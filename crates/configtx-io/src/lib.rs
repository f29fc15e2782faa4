//! # configtx-io
//!
//! Codec adapter: turns files, stdin, or in-memory bytes into typed
//! configuration messages, and typed messages back into bytes on a file or
//! stdout.
//!
//! ## Key Types
//!
//! - [`Input`] - A byte source plus base64 / JSON flags
//! - [`Output`] - An optional byte sink plus a JSON flag

pub mod error;
pub mod input;
pub mod output;

pub use error::{CodecError, Result};
pub use input::{Input, InputSource};
pub use output::{Output, OutputSink};
