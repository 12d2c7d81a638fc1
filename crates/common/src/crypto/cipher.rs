//! AES-256-GCM envelope encryption for single string fields.
//!
//! Every call to [`SecretCipher::encrypt`] draws a fresh 96-bit nonce, so the
//! same plaintext never produces the same blob twice. The blob layout is
//!
//! ```text
//! base64( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! Decryption fails closed: any malformed, truncated or tampered blob yields
//! [`CryptoError::DecryptFailed`] and never partial plaintext. Key bytes and
//! decrypted plaintext are held in [`Zeroizing`] buffers and wiped on drop.
//!
//! ## Usage
//!
//! ```rust
//! use jobsync_common::crypto::SecretCipher;
//!
//! let cipher = SecretCipher::new(SecretCipher::generate_key())?;
//! let blob = cipher.encrypt("api-token")?;
//! assert_eq!(cipher.decrypt(&blob)?.as_str(), "api-token");
//! # Ok::<(), jobsync_common::crypto::CryptoError>(())
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Key length for AES-256 in bytes.
pub const KEY_LEN: usize = 32;
/// Nonce length for AES-GCM in bytes.
pub const NONCE_LEN: usize = 12;
/// Authentication tag length appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Errors raised by [`SecretCipher`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The AEAD refused to seal the plaintext.
    #[error("secret encryption failed")]
    EncryptFailed,

    /// The blob is malformed, truncated, tampered with or sealed under
    /// another key.
    #[error("secret decryption failed: {0}")]
    DecryptFailed(&'static str),

    /// The key is not valid base64 or not 32 bytes long.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
}

/// Process-wide cipher for secrets persisted in the local store.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher").field("key", &"[REDACTED]").finish()
    }
}

impl SecretCipher {
    /// Create a cipher from a raw 32-byte key.
    ///
    /// The key buffer is wiped once the AES key schedule has been derived.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] unless the key is exactly
    /// [`KEY_LEN`] bytes.
    pub fn new(key: impl Into<Zeroizing<Vec<u8>>>) -> Result<Self, CryptoError> {
        let key = key.into();
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Create a cipher from a base64-encoded 32-byte key, as found in config.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] for non-base64 input or a decoded
    /// key of the wrong length.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CryptoError> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("key is not valid base64: {e}")))?;
        Self::new(key)
    }

    /// Generate a random 32-byte symmetric key.
    #[must_use]
    pub fn generate_key() -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt `plaintext` into a base64 blob of `nonce || ciphertext+tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptFailed`] if the AEAD rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce_bytes = Self::generate_nonce();
        let ciphertext = self
            .cipher
            .encrypt(&Nonce::from(nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a blob produced by [`SecretCipher::encrypt`].
    ///
    /// The plaintext is wiped when the returned value is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptFailed`] for any blob that does not
    /// authenticate under this key.
    pub fn decrypt(&self, blob: &str) -> Result<Zeroizing<String>, CryptoError> {
        let combined =
            BASE64.decode(blob).map_err(|_| CryptoError::DecryptFailed("malformed encoding"))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::DecryptFailed("blob too short"));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce_array: [u8; NONCE_LEN] =
            nonce_bytes.try_into().map_err(|_| CryptoError::DecryptFailed("invalid nonce"))?;

        let plaintext = self
            .cipher
            .decrypt(&Nonce::from(nonce_array), ciphertext)
            .map_err(|_| CryptoError::DecryptFailed("authentication failed"))?;

        match String::from_utf8(plaintext) {
            Ok(text) => Ok(Zeroizing::new(text)),
            Err(err) => {
                err.into_bytes().zeroize();
                Err(CryptoError::DecryptFailed("invalid utf-8"))
            }
        }
    }

    fn generate_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}
