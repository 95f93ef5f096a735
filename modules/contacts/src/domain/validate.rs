//! Explicit per-operation validators.
//!
//! Each validator returns `Ok(())` or the full list of field errors; callers
//! surface the first one.

use crate::contract::model::{ContactPatch, NewContact};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_UPLOAD_KB: usize = 2048;

/// A single failed rule, addressed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Rules for creating a contact: every field required.
pub fn validate_new_contact(new: &NewContact) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Err(e) = check_name(&new.name) {
        errors.push(e);
    }
    if let Err(e) = check_email(&new.email) {
        errors.push(e);
    }
    if let Err(e) = check_phone(&new.phone) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rules for updating a contact: every field optional, provided fields are
/// checked with the create rules.
pub fn validate_contact_patch(patch: &ContactPatch) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Some(ref name) = patch.name {
        if let Err(e) = check_name(name) {
            errors.push(e);
        }
    }
    if let Some(ref email) = patch.email {
        if let Err(e) = check_email(email) {
            errors.push(e);
        }
    }
    if let Some(ref phone) = patch.phone {
        if let Err(e) = check_phone(phone) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rules for the uploaded contacts file: present, JSON, bounded size.
pub fn validate_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    size_bytes: usize,
    max_kb: usize,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if !is_json_upload(file_name, content_type) {
        errors.push(FieldError::new(
            "file",
            "The file must be a file of type: json",
        ));
    }
    if size_bytes > max_kb * 1024 {
        errors.push(FieldError::new(
            "file",
            format!("The file must not be greater than {max_kb} kilobytes"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_json_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        if ct.eq_ignore_ascii_case("application/json") || ct.eq_ignore_ascii_case("text/json") {
            return true;
        }
    }
    file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".json"))
        .unwrap_or(false)
}

fn check_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::new("name", "The name field is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new(
            "name",
            format!("The name must not be greater than {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), FieldError> {
    if email.trim().is_empty() {
        return Err(FieldError::new("email", "The email field is required"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(FieldError::new(
            "email",
            format!("The email must not be greater than {MAX_EMAIL_LEN} characters"),
        ));
    }
    // Pragmatic syntax check, not a full RFC parser.
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    };
    if !well_formed {
        return Err(FieldError::new(
            "email",
            "The email must be a valid email address",
        ));
    }
    Ok(())
}

fn check_phone(phone: &str) -> Result<(), FieldError> {
    if phone.trim().is_empty() {
        return Err(FieldError::new("phone", "The phone field is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact(name: &str, email: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn valid_contact_passes() {
        assert!(validate_new_contact(&new_contact("Ada", "ada@example.com", "555-0100")).is_ok());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = validate_new_contact(&new_contact("", "", "")).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "The name field is required");
        assert_eq!(errors[1].field, "email");
        assert_eq!(errors[2].field, "phone");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["plainaddress", "no-domain@", "@no-local.com", "a@b", "a@b."] {
            let errors = validate_new_contact(&new_contact("Ada", bad, "555-0100")).unwrap_err();
            assert_eq!(errors[0].field, "email", "{bad} should fail");
        }
    }

    #[test]
    fn overlong_name_is_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let errors = validate_new_contact(&new_contact(&long, "a@b.com", "1")).unwrap_err();
        assert!(errors[0].message.contains("255"));
    }

    #[test]
    fn patch_only_checks_provided_fields() {
        let patch = ContactPatch {
            name: None,
            email: Some("still-valid@example.com".to_string()),
            phone: None,
        };
        assert!(validate_contact_patch(&patch).is_ok());

        let bad = ContactPatch {
            name: Some(String::new()),
            email: None,
            phone: None,
        };
        let errors = validate_contact_patch(&bad).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(validate_contact_patch(&ContactPatch::default()).is_ok());
    }

    #[test]
    fn upload_accepts_json_by_mime_or_extension() {
        assert!(validate_upload(Some("c.json"), None, 10, MAX_UPLOAD_KB).is_ok());
        assert!(validate_upload(Some("c.txt"), Some("application/json"), 10, MAX_UPLOAD_KB).is_ok());
        assert!(validate_upload(None, Some("APPLICATION/JSON"), 10, MAX_UPLOAD_KB).is_ok());
    }

    #[test]
    fn upload_rejects_wrong_type_and_oversize() {
        let errors = validate_upload(Some("c.csv"), Some("text/csv"), 10, MAX_UPLOAD_KB).unwrap_err();
        assert_eq!(errors[0].message, "The file must be a file of type: json");

        let errors =
            validate_upload(Some("c.json"), None, MAX_UPLOAD_KB * 1024 + 1, MAX_UPLOAD_KB)
                .unwrap_err();
        assert!(errors[0].message.contains("2048 kilobytes"));
    }
}
