use serde::Deserialize;

use crate::{errors::AppError, mail::OutgoingMail};

pub const DEFAULT_REPLY_SUBJECT: &str = "Thanks for Contacting Chewzy";

/// Auto-reply to a contact submission, as posted by the frontend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactReply {
    pub email: Option<String>,
    pub text: Option<String>,
    pub subject: Option<String>,
}

impl ContactReply {
    /// Blank subject falls back to the default; blank email or text is a 400.
    pub fn validate(&self) -> Result<OutgoingMail, AppError> {
        let email = non_blank(&self.email);
        let text = non_blank(&self.text);

        let (Some(email), Some(text)) = (email, text) else {
            return Err(AppError::BadRequest("Missing email, subject, or text".into()));
        };

        Ok(OutgoingMail {
            to: email.to_string(),
            subject: non_blank(&self.subject)
                .unwrap_or(DEFAULT_REPLY_SUBJECT)
                .to_string(),
            text: text.to_string(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
