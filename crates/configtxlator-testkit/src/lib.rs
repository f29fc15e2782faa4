//! # configtxlator testkit
//!
//! Testing utilities for the configtxlator crates.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Envelope framing inputs with their expected bytes
//! - **Generators**: Proptest strategies for configuration trees
//! - **Fixtures**: Temporary MSP directories and a sample channel config
//!
//! ## Golden Vectors
//!
//! ```rust
//! use configtxlator_testkit::vectors::{all_vectors, wrap_vector};
//!
//! for vector in all_vectors() {
//!     assert_eq!(hex::encode(wrap_vector(&vector)), vector.expected_hex);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use configtxlator_testkit::fixtures::multi_party_msps;
//!
//! let msps = multi_party_msps(2);
//! assert_eq!(msps[1].msp_id(), "Org2MSP");
//! assert!(msps[0].path().join("keystore").is_dir());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_msps, sample_config, TestMsp};
pub use generators::{config, config_group, ConfigPairParams};
pub use vectors::{all_vectors, wrap_vector, GoldenVector};
