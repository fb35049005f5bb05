use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    models::{ContactMessage, ContactRequest},
    utils::is_valid_email,
};

/// Destination for accepted contact submissions.
pub trait ContactLog: Send + Sync {
    fn record(&self, message: &ContactMessage) -> Result<()>;
}

/// Writes submissions to the application log.
pub struct TracingContactLog;

impl ContactLog for TracingContactLog {
    fn record(&self, message: &ContactMessage) -> Result<()> {
        tracing::info!(
            sender = %message.name,
            email = %message.email,
            subject = %message.subject,
            body = %message.message,
            timestamp = %message.received_at.to_rfc3339(),
            "Contact form submission"
        );
        Ok(())
    }
}

/// Contact Service - validates and records contact form submissions
pub struct ContactService {
    log: Arc<dyn ContactLog>,
}

impl ContactService {
    pub fn new(log: Arc<dyn ContactLog>) -> Self {
        Self { log }
    }

    /// Validates `req` and hands it to the log sink exactly once.
    pub fn submit(&self, req: ContactRequest) -> Result<ContactMessage> {
        let message = validate_contact(req)?;
        self.log.record(&message)?;
        Ok(message)
    }
}

// Internal helper that supports `required_field` operations.
fn required_field(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turns a raw form body into a `ContactMessage` or a 400-class error.
pub fn validate_contact(req: ContactRequest) -> Result<ContactMessage> {
    let (Some(name), Some(email), Some(subject), Some(message)) = (
        required_field(req.name),
        required_field(req.email),
        required_field(req.subject),
        required_field(req.message),
    ) else {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    };

    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    Ok(ContactMessage {
        name,
        email,
        subject,
        message,
        received_at: chrono::Utc::now(),
    })
}
