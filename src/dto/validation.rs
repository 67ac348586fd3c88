//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a destructive request was explicitly confirmed by the host.
///
/// # Examples
///
/// ```ignore
/// validate_confirmed(&true)  // Ok
/// validate_confirmed(&false) // Err - not confirmed
/// ```
pub fn validate_confirmed(confirm: &bool) -> Result<(), ValidationError> {
    if *confirm {
        return Ok(());
    }

    let mut err = ValidationError::new("confirmation_required");
    err.message = Some("this action must be confirmed with `confirm: true`".into());
    Err(err)
}
