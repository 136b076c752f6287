//! Common validation utilities.

use std::borrow::Cow;
use validator::ValidationError;

/// Maximum number of attachments on a single message.
pub const MAX_ATTACHMENTS: usize = 20;

/// Maximum length of a single attachment reference (URL or storage key).
pub const MAX_ATTACHMENT_REF_LENGTH: usize = 2048;

/// Normalizes an email address for comparison.
///
/// Attendee and invite emails are entered by different people at different
/// times, so matching is done on the trimmed, lowercased form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Value cannot be blank")));
    }
    Ok(())
}

/// Validates the attachment list of a message.
pub fn validate_attachment_refs(attachments: &[String]) -> Result<(), ValidationError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(ValidationError::new("too_many_attachments")
            .with_message(Cow::Borrowed("A message can have at most 20 attachments")));
    }
    for attachment in attachments {
        if attachment.trim().is_empty() {
            return Err(ValidationError::new("blank_attachment")
                .with_message(Cow::Borrowed("Attachment reference cannot be blank")));
        }
        if attachment.len() > MAX_ATTACHMENT_REF_LENGTH {
            return Err(ValidationError::new("attachment_too_long")
                .with_message(Cow::Borrowed(
                    "Attachment reference must be at most 2048 characters",
                )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
        assert_eq!(normalize_email("a@b.c"), "a@b.c");
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_not_blank_error_message() {
        let err = validate_not_blank("\t\n").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Value cannot be blank");
    }

    #[test]
    fn test_validate_attachment_refs() {
        assert!(validate_attachment_refs(&[]).is_ok());
        assert!(validate_attachment_refs(&["uploads/agenda.pdf".to_string()]).is_ok());
        assert!(validate_attachment_refs(&[" ".to_string()]).is_err());
    }

    #[test]
    fn test_validate_attachment_refs_limits() {
        let too_many: Vec<String> = (0..=MAX_ATTACHMENTS).map(|i| format!("file-{}", i)).collect();
        let err = validate_attachment_refs(&too_many).unwrap_err();
        assert_eq!(err.code, "too_many_attachments");

        let too_long = vec!["x".repeat(MAX_ATTACHMENT_REF_LENGTH + 1)];
        let err = validate_attachment_refs(&too_long).unwrap_err();
        assert_eq!(err.code, "attachment_too_long");
    }
}
