use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::Rng;

use crate::errors::internal::CryptoError;

/// Nonce length for AES-256-GCM (96 bits)
const NONCE_LEN: usize = 12;

/// GCM authentication tag length appended to the ciphertext
const TAG_LEN: usize = 16;

/// Placeholder substituted for a field whose envelope cannot be decrypted
pub const DECRYPT_PLACEHOLDER: &str = "[unavailable]";

/// Field-level encryption for sensitive incident data
///
/// Each field is sealed independently with AES-256-GCM and a fresh random
/// nonce, so list views can decrypt a single field without touching the
/// others and no nonce is ever reused across records or fields.
///
/// Envelope format: `base64(nonce || ciphertext || tag)`.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Create an EncryptionService from a 32-byte key
    pub fn new(key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self { cipher }
    }

    /// Encrypt one field value
    ///
    /// Empty input maps to an empty envelope without invoking the cipher, so
    /// storage never leaks whether an optional field was ever set.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(&combined))
    }

    /// Encrypt an optional field, passing `None` and empty strings through
    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, CryptoError> {
        match plaintext {
            Some(value) if !value.is_empty() => Ok(Some(self.encrypt(value)?)),
            _ => Ok(None),
        }
    }

    /// Decrypt one envelope back to plaintext
    ///
    /// Corrupted, truncated, or wrong-key envelopes surface as
    /// `DecryptionFailed`; callers on read paths should substitute a
    /// placeholder per field rather than abort the whole response.
    pub fn decrypt(&self, envelope: &str) -> Result<String, CryptoError> {
        if envelope.is_empty() {
            return Ok(String::new());
        }

        let combined = BASE64
            .decode(envelope)
            .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid base64: {}", e)))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::DecryptionFailed(
                "Envelope too short".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext_bytes = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed("Decryption failed".to_string()))?;

        String::from_utf8(plaintext_bytes)
            .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
    }

    /// Decrypt for a read path, substituting a placeholder on failure
    pub fn decrypt_or_placeholder(&self, envelope: &str) -> String {
        match self.decrypt(envelope) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                tracing::warn!(error = %err, "field decryption failed; substituting placeholder");
                DECRYPT_PLACEHOLDER.to_string()
            }
        }
    }

    /// Decrypt an optional envelope for a read path
    pub fn decrypt_opt_or_placeholder(&self, envelope: Option<&str>) -> Option<String> {
        envelope
            .filter(|e| !e.is_empty())
            .map(|e| self.decrypt_or_placeholder(e))
    }

    /// Decrypt a bounded preview of a field for list views
    ///
    /// Truncates on a character boundary and appends an ellipsis, so a list
    /// row never pays for (or exposes) the full field.
    pub fn decrypt_preview(&self, envelope: &str, max_chars: usize) -> String {
        let plaintext = self.decrypt_or_placeholder(envelope);
        if plaintext.chars().count() <= max_chars {
            return plaintext;
        }

        let truncated: String = plaintext.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EncryptionService {
        EncryptionService::new(&[7u8; 32])
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let service = test_service();
        let plaintext = "The incident occurred near the main entrance";

        let envelope = service.encrypt(plaintext).unwrap();
        assert_ne!(envelope, plaintext);

        let decrypted = service.decrypt(&envelope).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn round_trip_handles_unicode() {
        let service = test_service();
        let plaintext = "témoin: José — «l'été» 目撃者";

        let envelope = service.encrypt(plaintext).unwrap();
        assert_eq!(service.decrypt(&envelope).unwrap(), plaintext);
    }

    #[test]
    fn same_plaintext_yields_different_envelopes() {
        let service = test_service();
        let plaintext = "repeated content";

        let first = service.encrypt(plaintext).unwrap();
        let second = service.encrypt(plaintext).unwrap();

        // Fresh random nonce per call
        assert_ne!(first, second);
    }

    #[test]
    fn empty_plaintext_maps_to_empty_envelope() {
        let service = test_service();
        assert_eq!(service.encrypt("").unwrap(), "");
        assert_eq!(service.decrypt("").unwrap(), "");
    }

    #[test]
    fn encrypt_opt_passes_none_and_empty_through() {
        let service = test_service();
        assert_eq!(service.encrypt_opt(None).unwrap(), None);
        assert_eq!(service.encrypt_opt(Some("")).unwrap(), None);
        assert!(service.encrypt_opt(Some("value")).unwrap().is_some());
    }

    #[test]
    fn decrypt_rejects_invalid_base64() {
        let service = test_service();
        let err = service.decrypt("not base64!!!").unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn decrypt_rejects_truncated_envelope() {
        let service = test_service();
        let err = service.decrypt(&BASE64.encode([0u8; 10])).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn decrypt_rejects_tampered_ciphertext() {
        let service = test_service();
        let envelope = service.encrypt("original").unwrap();

        let mut bytes = BASE64.decode(&envelope).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tampered = BASE64.encode(&bytes);

        let err = service.decrypt(&tampered).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let envelope = test_service().encrypt("secret").unwrap();
        let other = EncryptionService::new(&[8u8; 32]);

        assert!(matches!(
            other.decrypt(&envelope),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn placeholder_substituted_on_corrupt_envelope() {
        let service = test_service();
        assert_eq!(service.decrypt_or_placeholder("garbage"), DECRYPT_PLACEHOLDER);
    }

    #[test]
    fn preview_truncates_long_fields() {
        let service = test_service();
        let plaintext = "a".repeat(500);
        let envelope = service.encrypt(&plaintext).unwrap();

        let preview = service.decrypt_preview(&envelope, 200);
        assert_eq!(preview.chars().count(), 203); // 200 chars + "..."
        assert!(preview.ends_with("..."));

        let short = service.encrypt("short").unwrap();
        assert_eq!(service.decrypt_preview(&short, 200), "short");
    }
}
