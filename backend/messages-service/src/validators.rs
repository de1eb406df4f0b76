use uuid::Uuid;

use crate::error::AppError;

/// Subject length bound, in characters.
pub const SUBJECT_MAX_LEN: usize = 140;

/// Compose/reply input checks. These run in the service layer before any
/// store access, so a validation failure never touches the database.
pub fn validate_subject(subject: &str) -> Result<(), AppError> {
    if subject.trim().is_empty() {
        return Err(AppError::Validation("subject is required".into()));
    }
    if subject.chars().count() > SUBJECT_MAX_LEN {
        return Err(AppError::Validation(format!(
            "subject must be at most {SUBJECT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_body(body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("body is required".into()));
    }
    Ok(())
}

pub fn validate_recipients(recipients: &[Uuid]) -> Result<(), AppError> {
    if recipients.is_empty() {
        return Err(AppError::Validation("recipient is required".into()));
    }
    Ok(())
}
