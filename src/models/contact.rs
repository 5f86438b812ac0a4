use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn normalized(&self) -> Result<ContactForm, Error> {
        let form = ContactForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        super::require("Name", &form.name)?;
        super::require("Email", &form.email)?;
        super::require("Subject", &form.subject)?;
        super::require("Message", &form.message)?;
        super::require_email(&form.email)?;
        Ok(form)
    }
}
