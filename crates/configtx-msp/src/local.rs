//! Loading signers from a local MSP directory.
//!
//! Layout:
//!
//! ```text
//! <msp_dir>/
//!   signcerts/   identity credential (PEM), first file by name
//!   keystore/    PKCS#8 PEM Ed25519 private key, first file by name
//! ```

use std::path::{Path, PathBuf};

use configtx_core::{Ed25519PublicKey, Keypair};
use tracing::{debug, info};

use crate::error::{MspError, Result};
use crate::signer::{LocalSigner, SigningIdentity};

/// Sub-directory holding the identity credential.
pub const SIGNCERTS_DIR: &str = "signcerts";

/// Sub-directory holding the private key.
pub const KEYSTORE_DIR: &str = "keystore";

/// Load the signing identity stored in `msp_dir`.
pub fn load_local_msp(msp_dir: &Path, msp_id: &str) -> Result<LocalSigner> {
    let cert_path = first_file(&msp_dir.join(SIGNCERTS_DIR))?;
    let key_path = first_file(&msp_dir.join(KEYSTORE_DIR))?;

    let id_bytes = read(&cert_path)?;
    let key_pem = String::from_utf8(read(&key_path)?).map_err(|_| MspError::InvalidKey {
        path: key_path.clone(),
        reason: "not UTF-8 PEM".into(),
    })?;
    let keypair = Keypair::from_pkcs8_pem(&key_pem).map_err(|e| MspError::InvalidKey {
        path: key_path.clone(),
        reason: e.to_string(),
    })?;

    // A bare public key credential must belong to the private key. Other
    // credential formats are carried opaquely.
    if let Some(public_key) = std::str::from_utf8(&id_bytes)
        .ok()
        .and_then(|pem| Ed25519PublicKey::from_pem(pem).ok())
    {
        if public_key != keypair.public_key() {
            return Err(MspError::IdentityMismatch(cert_path));
        }
    }

    info!(msp_id, msp_dir = %msp_dir.display(), "loaded local MSP");
    Ok(LocalSigner::new(SigningIdentity::new(msp_id, id_bytes), keypair))
}

/// Resolve the optional signer for a request.
///
/// An absent or empty directory means no signer.
pub fn resolve_signer(msp_id: &str, msp_dir: Option<&Path>) -> Result<Option<LocalSigner>> {
    match msp_dir {
        Some(dir) if !dir.as_os_str().is_empty() => load_local_msp(dir, msp_id).map(Some),
        _ => {
            debug!(msp_id, "no MSP directory given, not signing");
            Ok(None)
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| MspError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn first_file(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|source| MspError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MspError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    files
        .into_iter()
        .next()
        .ok_or_else(|| MspError::EmptyDirectory(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Signer;
    use configtxlator_testkit::TestMsp;

    #[test]
    fn test_load_generated_msp() {
        let msp = TestMsp::new("Org1MSP", 1);
        let signer = load_local_msp(msp.path(), "Org1MSP").unwrap();
        assert_eq!(signer.msp_id(), "Org1MSP");
        assert_eq!(signer.public_key(), msp.keypair().public_key());
    }

    #[test]
    fn test_resolve_absent_and_empty() {
        assert!(resolve_signer("Org1MSP", None).unwrap().is_none());
        assert!(resolve_signer("Org1MSP", Some(Path::new(""))).unwrap().is_none());

        let msp = TestMsp::new("Org1MSP", 2);
        assert!(resolve_signer("Org1MSP", Some(msp.path())).unwrap().is_some());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_local_msp(&dir.path().join("nope"), "Org1MSP").unwrap_err();
        assert!(matches!(err, MspError::Io { .. }));
    }

    #[test]
    fn test_empty_keystore() {
        let msp = TestMsp::new("Org1MSP", 3);
        let keystore = msp.path().join(KEYSTORE_DIR);
        for entry in std::fs::read_dir(&keystore).unwrap() {
            std::fs::remove_file(entry.unwrap().path()).unwrap();
        }

        let err = load_local_msp(msp.path(), "Org1MSP").unwrap_err();
        assert!(matches!(err, MspError::EmptyDirectory(_)));
    }

    #[test]
    fn test_garbage_key() {
        let msp = TestMsp::new("Org1MSP", 4);
        let keystore = msp.path().join(KEYSTORE_DIR);
        for entry in std::fs::read_dir(&keystore).unwrap() {
            std::fs::write(entry.unwrap().path(), b"garbage").unwrap();
        }

        let err = load_local_msp(msp.path(), "Org1MSP").unwrap_err();
        assert!(matches!(err, MspError::InvalidKey { .. }));
    }

    #[test]
    fn test_mismatched_identity() {
        let msp = TestMsp::new("Org1MSP", 5);
        let other = Keypair::from_seed(&[0xee; 32]).public_key().to_pem().unwrap();
        std::fs::write(msp.path().join(SIGNCERTS_DIR).join("cert.pem"), other).unwrap();

        let err = load_local_msp(msp.path(), "Org1MSP").unwrap_err();
        assert!(matches!(err, MspError::IdentityMismatch(_)));
    }

    #[test]
    fn test_opaque_certificate_accepted() {
        let msp = TestMsp::new("Org1MSP", 6);
        let cert = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        std::fs::write(msp.path().join(SIGNCERTS_DIR).join("cert.pem"), cert).unwrap();

        let signer = load_local_msp(msp.path(), "Org1MSP").unwrap();
        assert_eq!(signer.identity().id_bytes(), cert);
    }
}
