//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::Path;

use configtx_core::{
    Config, ConfigGroup, ConfigPolicy, ConfigValue, HashingAlgorithm, ImplicitMetaRule, Keypair,
    Policy,
};
use prost::Message;
use tempfile::TempDir;

/// A temporary MSP directory holding one Ed25519 identity.
///
/// The directory is removed when the fixture is dropped.
pub struct TestMsp {
    dir: TempDir,
    msp_id: String,
    keypair: Keypair,
}

impl TestMsp {
    /// Create an MSP with a deterministic key derived from `seed`.
    ///
    /// Writes `signcerts/cert.pem` (the PEM public key) and
    /// `keystore/priv_sk` (the PKCS#8 private key).
    pub fn new(msp_id: &str, seed: u8) -> Self {
        let keypair = Keypair::from_seed(&[seed; 32]);
        let dir = tempfile::tempdir().expect("create temp MSP dir");

        let signcerts = dir.path().join("signcerts");
        let keystore = dir.path().join("keystore");
        std::fs::create_dir_all(&signcerts).expect("create signcerts");
        std::fs::create_dir_all(&keystore).expect("create keystore");

        let cert = keypair.public_key().to_pem().expect("encode public key");
        let key = keypair.to_pkcs8_pem().expect("encode private key");
        std::fs::write(signcerts.join("cert.pem"), cert).expect("write cert");
        std::fs::write(keystore.join("priv_sk"), key).expect("write key");

        Self {
            dir,
            msp_id: msp_id.to_string(),
            keypair,
        }
    }

    /// The MSP directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

/// Create MSPs `Org1MSP`, `Org2MSP`, ... with distinct keys.
pub fn multi_party_msps(count: usize) -> Vec<TestMsp> {
    (0..count)
        .map(|i| TestMsp::new(&format!("Org{}MSP", i + 1), i as u8 + 1))
        .collect()
}

fn admins_policy() -> ConfigPolicy {
    ConfigPolicy {
        version: 0,
        policy: Some(Policy::implicit_meta(ImplicitMetaRule::Majority, "Admins")),
        mod_policy: "Admins".into(),
    }
}

/// A small but realistic channel config: a channel group with a hashing
/// algorithm value, an `Application` group, and one organization.
pub fn sample_config() -> Config {
    let mut org = ConfigGroup::at_version(0);
    org.mod_policy = "Admins".into();
    org.policies.insert("Admins".into(), admins_policy());
    org.values.insert(
        "MSP".into(),
        ConfigValue {
            version: 0,
            value: b"org1-msp-config".to_vec(),
            mod_policy: "Admins".into(),
        },
    );

    let mut application = ConfigGroup::at_version(1);
    application.mod_policy = "Admins".into();
    application.policies.insert("Admins".into(), admins_policy());
    application.groups.insert("Org1MSP".into(), org);

    let mut channel = ConfigGroup::at_version(0);
    channel.mod_policy = "Admins".into();
    channel.policies.insert("Admins".into(), admins_policy());
    channel.values.insert(
        "HashingAlgorithm".into(),
        ConfigValue {
            version: 0,
            value: HashingAlgorithm {
                name: "SHA256".into(),
            }
            .encode_to_vec(),
            mod_policy: "Admins".into(),
        },
    );
    channel.groups.insert("Application".into(), application);

    Config {
        sequence: 3,
        channel_group: Some(channel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msp_layout() {
        let msp = TestMsp::new("Org1MSP", 1);
        let cert = std::fs::read_to_string(msp.path().join("signcerts/cert.pem")).unwrap();
        assert!(cert.contains("BEGIN PUBLIC KEY"));
        let key = std::fs::read_to_string(msp.path().join("keystore/priv_sk")).unwrap();
        assert!(key.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn test_multi_party_keys_differ() {
        let msps = multi_party_msps(3);
        assert_eq!(msps[2].msp_id(), "Org3MSP");
        assert_ne!(msps[0].keypair().public_key(), msps[1].keypair().public_key());
        assert_ne!(msps[0].path(), msps[1].path());
    }

    #[test]
    fn test_sample_config_json_roundtrip() {
        let config = sample_config();
        let json = serde_json_roundtrip(&config);
        assert_eq!(json, config);
    }

    fn serde_json_roundtrip(config: &Config) -> Config {
        let bytes = configtx_core::codec::to_json(config).unwrap();
        configtx_core::codec::from_json(&bytes).unwrap()
    }
}
