//! Widevine license session.
//!
//! A session turns a PSSH payload into a signed license challenge and then
//! unwraps the content keys from the license the server answers with.

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use cmac::Cmac;
use hmac::{Hmac, Mac};
use prost::Message;
use rsa::{Oaep, Pss};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::api::auth::unix_time;
use crate::drm::device::WidevineDevice;
use crate::drm::protocol::{
    ContentIdentification, KeyType, License, LicenseRequest, LicenseType, MessageType,
    ProtocolVersion, RequestType, SignedMessage, WidevinePsshData,
};
use crate::error::{Error, Result};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// A decrypted key from a license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey {
    pub key_id: Vec<u8>,
    pub key: Vec<u8>,
}

impl ContentKey {
    pub fn key_id_hex(&self) -> String {
        hex::encode(&self.key_id)
    }

    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }
}

/// One license exchange for one PSSH.
pub struct LicenseSession<'a> {
    device: &'a WidevineDevice,
    init_data: Vec<u8>,
    /// Serialized `LicenseRequest` of the last challenge; the key derivation
    /// contexts are built from it.
    request_msg: Option<Vec<u8>>,
}

impl<'a> LicenseSession<'a> {
    pub fn new(device: &'a WidevineDevice, init_data: &[u8]) -> Self {
        Self {
            device,
            init_data: init_data.to_vec(),
            request_msg: None,
        }
    }

    /// Build the signed license challenge to POST to the license server.
    pub fn license_request(&mut self) -> Result<Vec<u8>> {
        let request = LicenseRequest {
            client_id: Some(self.device.client_id.clone()),
            content_id: Some(ContentIdentification {
                widevine_pssh_data: Some(WidevinePsshData {
                    pssh_data: vec![self.init_data.clone()],
                    license_type: Some(LicenseType::Streaming as i32),
                    request_id: Some(rand::random::<[u8; 16]>().to_vec()),
                }),
            }),
            r#type: Some(RequestType::New as i32),
            request_time: Some(unix_time()),
            protocol_version: Some(ProtocolVersion::Version21 as i32),
            key_control_nonce: Some(rand::random::<u32>()),
        };
        let msg = request.encode_to_vec();

        let digest = Sha1::digest(&msg);
        let signature = self.device.private_key.sign_with_rng(
            &mut rand::thread_rng(),
            Pss::new::<Sha1>(),
            &digest,
        )?;

        let signed = SignedMessage {
            r#type: Some(MessageType::LicenseRequest as i32),
            msg: Some(msg.clone()),
            signature: Some(signature),
            session_key: None,
            oemcrypto_core_message: None,
        };

        self.request_msg = Some(msg);
        Ok(signed.encode_to_vec())
    }

    /// Verify a license response and decrypt its content keys.
    pub fn parse_license(&self, response: &[u8]) -> Result<Vec<ContentKey>> {
        let request_msg = self
            .request_msg
            .as_deref()
            .ok_or_else(|| Error::License("no license request was made in this session".into()))?;

        let signed = SignedMessage::decode(response)?;
        if signed.r#type != Some(MessageType::License as i32) {
            return Err(Error::License(format!(
                "expected a LICENSE message, got type {:?}",
                signed.r#type
            )));
        }

        let msg = signed
            .msg
            .as_deref()
            .ok_or_else(|| Error::License("license carries no message".into()))?;
        let signature = signed
            .signature
            .as_deref()
            .ok_or_else(|| Error::License("license carries no signature".into()))?;
        let wrapped_key = signed
            .session_key
            .as_deref()
            .ok_or_else(|| Error::License("license carries no session key".into()))?;

        let session_key = self
            .device
            .private_key
            .decrypt(Oaep::new::<Sha1>(), wrapped_key)?;
        let keys = DerivedKeys::derive(&session_key, request_msg)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(&keys.mac_server)
            .map_err(|e| Error::License(format!("bad MAC key: {}", e)))?;
        if let Some(core) = &signed.oemcrypto_core_message {
            mac.update(core);
        }
        mac.update(msg);
        mac.verify_slice(signature)
            .map_err(|_| Error::License("license signature mismatch".into()))?;

        let license = License::decode(msg)?;
        let mut content_keys = Vec::new();
        for container in &license.key {
            if container.r#type != Some(KeyType::Content as i32) {
                continue;
            }
            let (Some(iv), Some(encrypted)) = (&container.iv, &container.key) else {
                continue;
            };

            content_keys.push(ContentKey {
                key_id: container.id.clone().unwrap_or_default(),
                key: decrypt_key(&keys.enc, iv, encrypted)?,
            });
        }

        if content_keys.is_empty() {
            return Err(Error::License("license contains no content keys".into()));
        }

        Ok(content_keys)
    }
}

/// Keys derived from the session key.
pub(crate) struct DerivedKeys {
    pub enc: Vec<u8>,
    pub mac_server: Vec<u8>,
}

impl DerivedKeys {
    pub(crate) fn derive(session_key: &[u8], request_msg: &[u8]) -> Result<Self> {
        let enc_context = context(b"ENCRYPTION", request_msg, 128);
        let mac_context = context(b"AUTHENTICATION", request_msg, 512);

        let enc = cmac(session_key, 1, &enc_context)?;
        let mut mac_server = cmac(session_key, 1, &mac_context)?;
        mac_server.extend(cmac(session_key, 2, &mac_context)?);

        Ok(Self { enc, mac_server })
    }
}

/// `label || 0x00 || request || key_size_bits (big endian)`
fn context(label: &[u8], request_msg: &[u8], key_size_bits: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(label.len() + 1 + request_msg.len() + 4);
    out.extend_from_slice(label);
    out.push(0);
    out.extend_from_slice(request_msg);
    out.extend_from_slice(&key_size_bits.to_be_bytes());
    out
}

fn cmac(key: &[u8], counter: u8, context: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Cmac::<Aes128>::new_from_slice(key)
        .map_err(|e| Error::License(format!("bad session key: {}", e)))?;
    mac.update(&[counter]);
    mac.update(context);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn decrypt_key(enc_key: &[u8], iv: &[u8], encrypted: &[u8]) -> Result<Vec<u8>> {
    let mut buf = encrypted.to_vec();
    let plain = Aes128CbcDec::new_from_slices(enc_key, iv)
        .map_err(|e| Error::License(format!("bad key container: {}", e)))?
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| Error::License("bad key padding".into()))?;
    Ok(plain.to_vec())
}
