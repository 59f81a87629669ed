use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::User;
use crate::validation::{is_valid_email, ValidationErrors};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// Trims all text fields and lowercases the email, so equality checks and
    /// the unique index see one canonical form.
    pub fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Email is not a valid email address.");
        }
        let password_len = self.password.chars().count();
        if !(6..=100).contains(&password_len) {
            errors.add("password", "Password must be between 6 and 100 characters.");
        }
        if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords do not match.");
        }
        check_name(&mut errors, "firstName", &self.first_name);
        check_name(&mut errors, "lastName", &self.last_name);
        errors.into_result()
    }
}

fn check_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !(2..=100).contains(&value.chars().count()) {
        errors.add(field, "Must be between 2 and 100 characters.");
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// User as returned by `/api/auth/me`. The password hash is omitted entirely,
/// not blanked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            email: "alice@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            first_name: "Alice".into(),
            last_name: "Martin".into(),
        }
    }

    #[test]
    fn normalize_lowercases_and_trims_email() {
        let mut request = valid_request();
        request.email = "  Alice@Example.COM ".into();
        request.first_name = " Alice ".into();
        request.normalize();
        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.first_name, "Alice");
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut request = valid_request();
        request.password = "five5".into();
        request.confirm_password = "five5".into();
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn six_character_password_is_accepted() {
        let mut request = valid_request();
        request.password = "sixsix".into();
        request.confirm_password = "sixsix".into();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut request = valid_request();
        request.confirm_password = "different".into();
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("confirmPassword"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut request = valid_request();
        request.email = "not-an-email".into();
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn one_character_name_is_rejected() {
        let mut request = valid_request();
        request.first_name = "A".into();
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("firstName"));
    }

    #[test]
    fn auth_response_uses_camel_case_and_rfc3339() {
        let response = AuthResponse {
            token: "tok".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Martin".into(),
            expires_at: datetime!(2026-08-13 12:00:00 UTC),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["lastName"], "Martin");
        assert_eq!(json["expiresAt"], "2026-08-13T12:00:00Z");
    }

    #[test]
    fn user_response_has_no_password_field() {
        let response = UserResponse {
            id: 1,
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Martin".into(),
            created_at: datetime!(2026-01-01 00:00:00 UTC),
            is_active: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"isActive\":true"));
    }
}
