//! Field-level request validation.
//!
//! Handlers collect per-field failures into a [`FieldErrors`] and reject the
//! request as one 400 response naming every bad field, rather than failing
//! on the first.

use std::collections::BTreeMap;

use crate::ApiError;

/// Accumulates field name → message pairs.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    /// Require `value` to be `min..=max` characters after trimming.
    pub fn require_len(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.add(
                field,
                format!("must be between {} and {} characters", min, max),
            );
        }
    }

    /// Require `value` to be at least `min` characters.
    pub fn require_min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("must be at least {} characters", min));
        }
    }

    /// Shallow email shape check: something@something, within length bounds.
    pub fn require_email(&mut self, field: &str, value: &str, max: usize) {
        let trimmed = value.trim();
        let well_formed = trimmed.len() <= max
            && trimmed
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
        if !well_formed {
            self.add(field, "must be a valid email address");
        }
    }

    /// Require two fields to match (e.g. password confirmation).
    pub fn require_match(&mut self, field: &str, a: &str, b: &str) {
        if a != b {
            self.add(field, "does not match");
        }
    }

    /// Succeed, or reject the request with every recorded failure.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_pass() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_length_bounds() {
        let mut v = FieldErrors::new();
        v.require_len("title", "ok", 2, 50);
        assert!(v.into_result().is_ok());

        let mut v = FieldErrors::new();
        v.require_len("title", "x", 2, 50);
        v.require_len("description", &"d".repeat(501), 3, 500);
        match v.into_result() {
            Err(ApiError::Validation(fields)) => {
                assert!(fields.contains_key("title"));
                assert!(fields.contains_key("description"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_length_counts_trimmed_chars() {
        let mut v = FieldErrors::new();
        v.require_len("title", "  a  ", 2, 50);
        assert!(v.into_result().is_err());
    }

    #[test]
    fn test_email_shape() {
        let mut v = FieldErrors::new();
        v.require_email("email", "ada@example.com", 150);
        assert!(v.into_result().is_ok());

        for bad in ["", "plainaddress", "@no-local.com", "user@nodot"] {
            let mut v = FieldErrors::new();
            v.require_email("email", bad, 150);
            assert!(v.into_result().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_password_confirmation() {
        let mut v = FieldErrors::new();
        v.require_match("password_confirmation", "secret1", "secret2");
        match v.into_result() {
            Err(ApiError::Validation(fields)) => {
                assert!(fields.contains_key("password_confirmation"))
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
