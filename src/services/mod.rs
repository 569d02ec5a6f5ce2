// Services layer - Business logic and orchestration
pub mod encryption_service;
pub mod notes_service;
pub mod reference;
pub mod safety_service;

pub use encryption_service::EncryptionService;
pub use notes_service::NotesService;
pub use reference::{DateRandomGenerator, ReferenceNumberGenerator};
pub use safety_service::SafetyService;
