//! Field-level sealing for profile PII.
//!
//! Values are sealed with ChaCha20-Poly1305 under a key held by the server
//! configuration and stored as `base64(nonce || ciphertext)`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::Rng;
use thiserror::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum PiiError {
    #[error("pii key must be {KEY_LEN} bytes of base64")]
    BadKey,
    #[error("sealed value is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("sealed value is truncated")]
    Truncated,
    #[error("sealed value failed authentication")]
    Tampered,
    #[error("opened value is not utf-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Clone)]
pub struct PiiCipher {
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for PiiCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PiiCipher(..)")
    }
}

impl PiiCipher {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, PiiError> {
        let raw = STANDARD.decode(encoded)?;
        let key: [u8; KEY_LEN] = raw.try_into().map_err(|_| PiiError::BadKey)?;
        Ok(Self::new(key))
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, PiiError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| PiiError::Tampered)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    pub fn open(&self, sealed: &str) -> Result<String, PiiError> {
        let raw = STANDARD.decode(sealed)?;
        if raw.len() < NONCE_LEN {
            return Err(PiiError::Truncated);
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| PiiError::Tampered)?;

        Ok(String::from_utf8(plaintext)?)
    }

    pub fn seal_all(&self, values: &[String]) -> Result<Vec<String>, PiiError> {
        values.iter().map(|v| self.seal(v)).collect()
    }

    pub fn open_all(&self, values: &[String]) -> Result<Vec<String>, PiiError> {
        values.iter().map(|v| self.open(v)).collect()
    }
}
