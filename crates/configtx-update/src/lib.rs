//! # configtx-update
//!
//! Computes the update transaction between two configuration snapshots and
//! runs structural sanity checks over a configuration tree.
//!
//! ## Key Types
//!
//! - [`ConfigDiff`] - The diff contract: `(original, updated) → ConfigUpdate`
//! - [`ReadWriteSetDiff`] - Read-set / write-set computation
//! - [`Messages`] - Sanity-check diagnostics

pub mod compute;
pub mod error;
pub mod sanitycheck;

pub use compute::{ConfigDiff, ReadWriteSetDiff};
pub use error::{Result, UpdateError};
pub use sanitycheck::{check, ElementMessage, Messages};
