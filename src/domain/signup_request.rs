use chrono::{DateTime, SecondsFormat, Utc};

use super::signup_email::SignupEmail;
use super::signup_source::SignupSource;

/// One submission attempt. Built fresh per attempt and never mutated.
#[derive(Debug)]
pub struct SignupRequest {
    pub email: SignupEmail,
    pub source: SignupSource,
    pub submitted_at: DateTime<Utc>,
}

impl SignupRequest {
    pub fn parse(input: &str, source: SignupSource) -> Result<Self, String> {
        let email = SignupEmail::parse(input.trim().to_string())?;

        Ok(Self {
            email,
            source,
            submitted_at: Utc::now(),
        })
    }

    pub fn timestamp(&self) -> String {
        self.submitted_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
