//! Model validation: ordered error collection and validating extractors

pub mod extractors;
pub mod model_state;

pub use extractors::{JsonBodyRejection, ValidPath, ValidatedJson, ValidatedQuery};
pub use model_state::ModelState;

use validator::ValidationError;

/// Rejects empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}
