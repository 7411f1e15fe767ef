use serde::{Deserialize, Serialize};

use crate::errors::{AppError, FieldErrors};

const MIN_MESSAGE_LEN: usize = 10;

/// Partnership enquiry as typed into the contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub restaurant_name: String,
    pub contact_number: String,
    pub how_found_us: String,
    pub message: String,
}

/// A contact request that passed validation, with every field trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidContact {
    pub full_name: String,
    pub email: String,
    pub restaurant_name: String,
    pub contact_number: String,
    pub how_found_us: String,
    pub message: String,
}

impl ContactRequest {
    /// Prefilled form for a partnership plan activation.
    pub fn prefilled(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        require(&mut errors, "fullName", &self.full_name, "Full name is required");

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".into(), "Email is required".into());
        } else if !is_email_shaped(email) {
            errors.insert("email".into(), "Please enter a valid email".into());
        }

        require(
            &mut errors,
            "restaurantName",
            &self.restaurant_name,
            "Restaurant name is required",
        );
        require(
            &mut errors,
            "contactNumber",
            &self.contact_number,
            "Contact number is required",
        );
        require(
            &mut errors,
            "howFoundUs",
            &self.how_found_us,
            "Please tell us how you found us",
        );

        let message = self.message.trim();
        if message.is_empty() {
            errors.insert("message".into(), "Message is required".into());
        } else if message.chars().count() < MIN_MESSAGE_LEN {
            errors.insert(
                "message".into(),
                format!("Message must be at least {MIN_MESSAGE_LEN} characters"),
            );
        }

        errors
    }

    pub fn validate(&self) -> Result<ValidContact, AppError> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ValidContact {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            restaurant_name: self.restaurant_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            how_found_us: self.how_found_us.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
    }
}

/// `something@something.something` with no whitespace anywhere.
pub fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_email_shaped("a@b.co"));
        assert!(is_email_shaped("first.last@mail.example.com"));
        assert!(!is_email_shaped("a@b"));
        assert!(!is_email_shaped("@b.co"));
        assert!(!is_email_shaped("a@.co"));
        assert!(!is_email_shaped("a@b."));
        assert!(!is_email_shaped("a b@c.d"));
        assert!(!is_email_shaped("a@b@c.d"));
    }
}
