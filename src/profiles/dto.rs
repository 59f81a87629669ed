use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::validation::{is_valid_email, ValidationErrors};

/// Request body for creating or replacing a user profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Date,
}

impl ProfileRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "firstName", &self.first_name);
        check_name(&mut errors, "lastName", &self.last_name);
        if self.email.is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Email is not a valid email address.");
        } else if self.email.chars().count() > 100 {
            errors.add("email", "Email must not exceed 100 characters.");
        }
        // Today does not count as past.
        if self.birth_date >= OffsetDateTime::now_utc().date() {
            errors.add("birthDate", "Birth date must be in the past.");
        }
        errors.into_result()
    }
}

fn check_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !(2..=50).contains(&value.chars().count()) {
        errors.add(field, "Must be between 2 and 50 characters.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn valid_request() -> ProfileRequest {
        ProfileRequest {
            first_name: "Alice".into(),
            last_name: "Martin".into(),
            email: "alice@example.com".into(),
            birth_date: date!(1990 - 06 - 15),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn birth_date_today_is_rejected() {
        let mut request = valid_request();
        request.birth_date = OffsetDateTime::now_utc().date();
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("birthDate"));
    }

    #[test]
    fn birth_date_in_the_future_is_rejected() {
        let mut request = valid_request();
        request.birth_date = OffsetDateTime::now_utc().date() + time::Duration::days(30);
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("birthDate"));
    }

    #[test]
    fn yesterday_is_accepted() {
        let mut request = valid_request();
        request.birth_date = OffsetDateTime::now_utc().date() - time::Duration::days(1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn name_bounds_are_two_to_fifty() {
        let mut request = valid_request();
        request.first_name = "A".into();
        assert!(request.validate().is_err());

        request.first_name = "Al".into();
        assert!(request.validate().is_ok());

        request.first_name = "a".repeat(51);
        assert!(request.validate().is_err());
    }

    #[test]
    fn oversized_email_is_rejected() {
        let mut request = valid_request();
        request.email = format!("{}@example.com", "a".repeat(95));
        let errors = request.validate().unwrap_err().into_map();
        assert!(errors.contains_key("email"));
    }
}
