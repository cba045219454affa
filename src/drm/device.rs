//! Widevine device credentials.

use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::config::DrmConfig;
use crate::error::{Error, Result};

/// Private key and client identification blob of a provisioned device.
///
/// Loaded once at startup and shared read-only by every license session.
#[derive(Debug, Clone)]
pub struct WidevineDevice {
    pub private_key: RsaPrivateKey,
    pub client_id: Vec<u8>,
}

impl WidevineDevice {
    pub fn new(private_key: RsaPrivateKey, client_id: Vec<u8>) -> Self {
        Self {
            private_key,
            client_id,
        }
    }

    /// Load the device described by the `[drm]` section.
    ///
    /// Returns `Ok(None)` when neither file exists, so accounts without
    /// protected media need no device at all.
    pub fn load_if_present(config: &DrmConfig) -> Result<Option<Self>> {
        let key_exists = config.private_key.exists();
        let blob_exists = config.client_id.exists();

        match (key_exists, blob_exists) {
            (false, false) => Ok(None),
            (true, true) => Self::load(&config.private_key, &config.client_id).map(Some),
            (false, true) => Err(Error::Config(format!(
                "Widevine private key not found: {}",
                config.private_key.display()
            ))),
            (true, false) => Err(Error::Config(format!(
                "Widevine client id blob not found: {}",
                config.client_id.display()
            ))),
        }
    }

    /// Load a PEM private key (PKCS#1 or PKCS#8) and a client id blob.
    pub fn load(private_key: &Path, client_id: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(private_key)?;
        let key = parse_private_key(&pem).map_err(|e| {
            Error::Config(format!(
                "Invalid Widevine private key {}: {}",
                private_key.display(),
                e
            ))
        })?;

        let blob = std::fs::read(client_id)?;
        if blob.is_empty() {
            return Err(Error::Config(format!(
                "Widevine client id blob is empty: {}",
                client_id.display()
            )));
        }

        Ok(Self::new(key, blob))
    }
}

fn parse_private_key(pem: &str) -> std::result::Result<RsaPrivateKey, String> {
    RsaPrivateKey::from_pkcs1_pem(pem).or_else(|pkcs1_err| {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|pkcs8_err| format!("PKCS#1: {}; PKCS#8: {}", pkcs1_err, pkcs8_err))
    })
}
