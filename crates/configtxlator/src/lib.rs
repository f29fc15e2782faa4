//! # configtxlator
//!
//! Translate, diff, verify, and sign channel configuration transactions.
//!
//! ## Overview
//!
//! - **Translate**: any registered message between protobuf binary and its
//!   JSON projection
//! - **Update**: compute the read-set / write-set update between two configs,
//!   optionally wrapped in an unsigned CONFIG_UPDATE envelope
//! - **Verify**: structural sanity checks over a config tree
//! - **Sign**: append one organization's signature to a pending update
//!
//! The same [`Translator`] backs the `configtxlator` binary and the REST
//! server in [`rest`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use configtx_io::{Input, Output};
//! use configtxlator::{Translator, TranslatorConfig};
//!
//! fn example() -> configtxlator::Result<()> {
//!     let translator = Translator::new(TranslatorConfig::default());
//!
//!     let original = Input::file("original.pb");
//!     let updated = Input::file("updated.pb");
//!     let update = translator.compute_update(&original, &updated, "mychannel", true)?;
//!
//!     Output::file("update.pb").emit_dyn(update.as_message())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `configtxlator::core` - Wire model and envelope framing
//! - `configtxlator::io` - Input and output adapters
//! - `configtxlator::msp` - Signing identities

pub mod config;
pub mod error;
pub mod rest;
pub mod sign;
pub mod telemetry;
pub mod translator;
pub mod update;

pub use config::{EnvelopeDefaults, ServerConfig, TranslatorConfig, DEFAULT_HOSTNAME, DEFAULT_PORT};
pub use error::{Result, TranslatorError};
pub use sign::{SignOutcome, SignedEnvelope};
pub use translator::Translator;
pub use update::UpdateOutput;

pub use configtx_core as core;
pub use configtx_io as io;
pub use configtx_msp as msp;
