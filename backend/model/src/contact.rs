use std::{thread, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONTACT_DELAY: Duration = Duration::from_millis(200);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Missing required fields.")]
    MissingFields,

    #[error("Invalid email address.")]
    InvalidEmail,
}

/// Absent and `null` fields both count as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

impl ContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), Rejection> {
        validate(self.name(), self.email(), self.message())
    }
}

pub fn validate(name: &str, email: &str, message: &str) -> Result<(), Rejection> {
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(Rejection::MissingFields);
    }

    // "a.@" passes, "a@b" does not
    if !email.contains('@') || !email.contains('.') {
        return Err(Rejection::InvalidEmail);
    }

    Ok(())
}

/// Validates submissions and pretends to file them away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactDesk {
    delay: Duration,
}

impl ContactDesk {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn submit(&self, submission: &ContactSubmission) -> Result<String, Rejection> {
        submission.validate()?;

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        info!(name = submission.name(), "Contact accepted");

        Ok(format!(
            "Contact saved for {}. We'll reach out to {}.",
            submission.name(),
            submission.email()
        ))
    }
}

impl Default for ContactDesk {
    fn default() -> Self {
        Self::new(DEFAULT_CONTACT_DELAY)
    }
}
