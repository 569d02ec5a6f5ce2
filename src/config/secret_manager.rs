use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;

/// Length in bytes of the decoded field encryption key (AES-256)
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Custom error type for secret-related failures
///
/// Any variant here is startup-fatal: the process must not serve traffic
/// without a valid field encryption key.
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidEncoding { secret_name: String, message: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_encoding(secret_name: &str, message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            secret_name: secret_name.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidEncoding { secret_name, message } => {
                write!(f, "Secret '{}' is not valid base64: {}", secret_name, message)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must decode to {} bytes, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Centralized manager for application secrets
pub struct SecretManager {
    encryption_key: [u8; ENCRYPTION_KEY_LEN],
}

impl SecretManager {
    /// Initialize the SecretManager by loading and validating all secrets
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn init() -> Result<Self, SecretError> {
        let encryption_key = Self::load_key("ENCRYPTION_KEY")?;

        Ok(Self { encryption_key })
    }

    /// Build a SecretManager around a known key, bypassing the environment
    ///
    /// Used by test setup; production code goes through [`init`](Self::init).
    pub fn from_key(encryption_key: [u8; ENCRYPTION_KEY_LEN]) -> Self {
        Self { encryption_key }
    }

    /// Get the field encryption key
    pub fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_LEN] {
        &self.encryption_key
    }

    /// Load a base64-encoded key from an environment variable
    fn load_key(name: &str) -> Result<[u8; ENCRYPTION_KEY_LEN], SecretError> {
        let value = std::env::var(name).map_err(|_| SecretError::missing(name))?;

        let decoded = BASE64
            .decode(value.trim())
            .map_err(|e| SecretError::invalid_encoding(name, e.to_string()))?;

        if decoded.len() != ENCRYPTION_KEY_LEN {
            return Err(SecretError::invalid_length(
                name,
                ENCRYPTION_KEY_LEN,
                decoded.len(),
            ));
        }

        let mut key = [0u8; ENCRYPTION_KEY_LEN];
        key.copy_from_slice(&decoded);
        Ok(key)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}
