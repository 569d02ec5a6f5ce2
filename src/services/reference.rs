use rand::Rng;

use crate::errors::internal::InternalError;
use crate::stores::incident_store::IncidentStore;

const REFERENCE_PREFIX: &str = "SAF";
const SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const MAX_ATTEMPTS: usize = 10;

/// Source of human-readable incident reference numbers
pub trait ReferenceNumberGenerator: Send + Sync {
    fn candidate(&self) -> String;
}

/// Generates references of the form `SAF-YYYYMMDD-XXXX`
///
/// The suffix charset excludes ambiguous characters (0/O, 1/I/L) since
/// references are read back over the phone and typed into the status
/// lookup form.
pub struct DateRandomGenerator;

impl ReferenceNumberGenerator for DateRandomGenerator {
    fn candidate(&self) -> String {
        let date = chrono::Utc::now().format("%Y%m%d");
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..SUFFIX_CHARSET.len());
                SUFFIX_CHARSET[idx] as char
            })
            .collect();
        format!("{}-{}-{}", REFERENCE_PREFIX, date, suffix)
    }
}

/// Produce a reference number not already present in the store
///
/// Collisions are improbable but cheap to rule out; after a bounded number
/// of attempts the error propagates rather than looping forever.
pub async fn unique_reference(
    generator: &dyn ReferenceNumberGenerator,
    store: &IncidentStore,
) -> Result<String, InternalError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = generator.candidate();
        if !store.reference_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(InternalError::parse(
        "reference_number",
        "Exhausted attempts to generate a unique reference number",
    ))
}
