use thiserror::Error;

/// Errors raised by the field encryption module
///
/// `DecryptionFailed` is kept distinct so read paths can substitute a
/// per-field placeholder instead of aborting a whole response.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}
