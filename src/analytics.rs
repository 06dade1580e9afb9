use secrecy::{ExposeSecret, Secret};
use reqwest::Url;

use crate::configuration::AnalyticsSettings;
use crate::domain::{SignupEmail, SignupSource};

pub const SIGNUP_EVENT: &str = "waitlist_joined";

/// PostHog-style event sink. Everything it records is best-effort; callers are
/// expected to log and swallow failures.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: Secret<String>,
}

impl AnalyticsClient {
    pub fn new(base_url: Url, api_key: Secret<String>, timeout: std::time::Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the analytics http client");

        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    pub fn from_settings(settings: &AnalyticsSettings) -> Self {
        let base_url =
            Url::parse(&settings.base_url).expect("Failed to parse the analytics base url");

        Self::new(
            base_url,
            settings.api_key.clone(),
            std::time::Duration::from_secs(10),
        )
    }

    #[tracing::instrument(name = "Identifying a signup with analytics", skip(self, joined_at))]
    pub async fn identify(
        &self,
        email: &SignupEmail,
        joined_at: &str,
    ) -> Result<(), reqwest::Error> {
        let body = CaptureEvent {
            api_key: self.api_key.expose_secret(),
            event: "$identify",
            distinct_id: email.as_ref(),
            timestamp: joined_at,
            properties: IdentifyProperties {
                set: WaitlistTraits::new(email.as_ref(), joined_at),
            },
        };

        self.post(&body).await
    }

    #[tracing::instrument(
        name = "Capturing a signup event",
        skip(self, joined_at),
        fields(signup_source = %source)
    )]
    pub async fn capture_signup(
        &self,
        email: &SignupEmail,
        source: SignupSource,
        joined_at: &str,
    ) -> Result<(), reqwest::Error> {
        let body = CaptureEvent {
            api_key: self.api_key.expose_secret(),
            event: SIGNUP_EVENT,
            distinct_id: email.as_ref(),
            timestamp: joined_at,
            properties: SignupProperties {
                signup_source: source.as_str(),
                set: WaitlistTraits::new(email.as_ref(), joined_at),
            },
        };

        self.post(&body).await
    }

    async fn post<P: serde::Serialize>(
        &self,
        body: &CaptureEvent<'_, P>,
    ) -> Result<(), reqwest::Error> {
        let url = self
            .base_url
            .join("/capture/")
            .expect("Failed to build the analytics capture url");

        self.http_client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[derive(serde::Serialize)]
struct CaptureEvent<'a, P: serde::Serialize> {
    api_key: &'a str,
    event: &'a str,
    distinct_id: &'a str,
    timestamp: &'a str,
    properties: P,
}

#[derive(serde::Serialize)]
struct WaitlistTraits<'a> {
    email: &'a str,
    waitlist_status: &'a str,
    waitlist_join_date: &'a str,
}

impl<'a> WaitlistTraits<'a> {
    fn new(email: &'a str, joined_at: &'a str) -> Self {
        Self {
            email,
            waitlist_status: "pending",
            waitlist_join_date: joined_at,
        }
    }
}

#[derive(serde::Serialize)]
struct IdentifyProperties<'a> {
    #[serde(rename = "$set")]
    set: WaitlistTraits<'a>,
}

#[derive(serde::Serialize)]
struct SignupProperties<'a> {
    signup_source: &'a str,
    #[serde(rename = "$set")]
    set: WaitlistTraits<'a>,
}
