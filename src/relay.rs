use std::time::Duration;

use reqwest::Url;

use crate::configuration::RelaySettings;
use crate::domain::SignupRequest;

/// Wire shape used when talking to the form relay. Both variants carry the same
/// field set; which one a relay deployment expects is a configuration concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayTransport {
    Multipart,
    Json,
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http_client: reqwest::Client,
    endpoint: Url,
    transport: RelayTransport,
    subject: String,
}

impl RelayClient {
    pub fn new(endpoint: Url, transport: RelayTransport, subject: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the relay http client");

        Self {
            http_client,
            endpoint,
            transport,
            subject,
        }
    }

    pub fn from_settings(settings: &RelaySettings) -> Self {
        let endpoint =
            Url::parse(&settings.endpoint).expect("Failed to parse the form relay endpoint");

        Self::new(
            endpoint,
            settings.transport,
            settings.subject.clone(),
            settings.timeout(),
        )
    }

    #[tracing::instrument(
        name = "Delivering a signup to the form relay",
        skip(self, signup),
        fields(
            signup_source = %signup.source,
            relay_transport = ?self.transport
        )
    )]
    pub async fn send(&self, signup: &SignupRequest) -> Result<(), reqwest::Error> {
        let request = match self.transport {
            RelayTransport::Multipart => self
                .http_client
                .post(self.endpoint.clone())
                .multipart(self.multipart_payload(signup)),
            RelayTransport::Json => self
                .http_client
                .post(self.endpoint.clone())
                .json(&JsonPayload::new(signup, &self.subject)),
        };

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), "form relay responded");
        response.error_for_status()?;

        Ok(())
    }

    fn multipart_payload(&self, signup: &SignupRequest) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("email", signup.email.as_ref().to_string())
            .text("source", signup.source.as_str())
            .text("timestamp", signup.timestamp())
            // Relay-specific metadata: subject line plus anti-spam flags
            .text("_subject", self.subject.clone())
            .text("_captcha", "false")
            .text("_template", "table")
    }
}

#[derive(serde::Serialize)]
struct JsonPayload<'a> {
    email: &'a str,
    source: &'a str,
    timestamp: String,
    #[serde(rename = "_subject")]
    subject: &'a str,
    #[serde(rename = "_captcha")]
    captcha: &'a str,
    #[serde(rename = "_template")]
    template: &'a str,
}

impl<'a> JsonPayload<'a> {
    fn new(signup: &'a SignupRequest, subject: &'a str) -> Self {
        Self {
            email: signup.email.as_ref(),
            source: signup.source.as_str(),
            timestamp: signup.timestamp(),
            subject,
            captcha: "false",
            template: "table",
        }
    }
}
