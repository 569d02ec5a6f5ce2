use crate::errors::InternalError;
use poem_openapi::{payload::Json, ApiResponse, Object};

/// Standardized error response for safety endpoints
#[derive(Object, Debug)]
pub struct SafetyErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Safety subsystem error types
///
/// Messages are deliberately generic: access and lookup failures never reveal
/// whether a record exists or why access was refused, and internal failures
/// never carry raw error text across the API boundary.
#[derive(ApiResponse, Debug)]
pub enum SafetyError {
    /// Actor is not permitted to perform this operation
    #[oai(status = 403)]
    AccessDenied(Json<SafetyErrorResponse>),

    /// Incident, note, or reference number not found
    #[oai(status = 404)]
    NotFound(Json<SafetyErrorResponse>),

    /// Attempted edit or delete of a system note
    #[oai(status = 409)]
    NoteImmutable(Json<SafetyErrorResponse>),

    /// Malformed input
    #[oai(status = 400)]
    Validation(Json<SafetyErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    Internal(Json<SafetyErrorResponse>),
}

impl SafetyError {
    /// Create an AccessDenied error
    ///
    /// Same message for every denial; callers must not leak the reason.
    pub fn access_denied() -> Self {
        SafetyError::AccessDenied(Json(SafetyErrorResponse {
            error: "access_denied".to_string(),
            message: "Access denied".to_string(),
            status_code: 403,
        }))
    }

    /// Create a NotFound error
    pub fn not_found() -> Self {
        SafetyError::NotFound(Json(SafetyErrorResponse {
            error: "not_found".to_string(),
            message: "Not found".to_string(),
            status_code: 404,
        }))
    }

    /// Create a NoteImmutable error
    pub fn note_immutable() -> Self {
        SafetyError::NoteImmutable(Json(SafetyErrorResponse {
            error: "note_immutable".to_string(),
            message: "System notes cannot be edited or deleted".to_string(),
            status_code: 409,
        }))
    }

    /// Create a Validation error with a caller-facing message
    pub fn validation(message: impl Into<String>) -> Self {
        SafetyError::Validation(Json(SafetyErrorResponse {
            error: "validation_failure".to_string(),
            message: message.into(),
            status_code: 400,
        }))
    }

    /// Create an Internal error with a fixed user-safe message
    pub fn internal() -> Self {
        SafetyError::Internal(Json(SafetyErrorResponse {
            error: "internal_error".to_string(),
            message: "The operation could not be completed".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> &str {
        match self {
            SafetyError::AccessDenied(json)
            | SafetyError::NotFound(json)
            | SafetyError::NoteImmutable(json)
            | SafetyError::Validation(json)
            | SafetyError::Internal(json) => &json.0.message,
        }
    }
}

impl From<InternalError> for SafetyError {
    /// Internal errors are logged with full detail and surfaced generically
    fn from(err: InternalError) -> Self {
        tracing::error!(error = %err, "internal error in safety operation");
        SafetyError::internal()
    }
}
