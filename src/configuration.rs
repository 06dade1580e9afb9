use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

use crate::relay::RelayTransport;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub relay: RelaySettings,
    // Absent when the embedding page ships without an analytics snippet
    pub analytics: Option<AnalyticsSettings>,
    pub form: FormSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct RelaySettings {
    pub endpoint: String,
    pub transport: RelayTransport,
    pub subject: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl RelaySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct AnalyticsSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
}

#[derive(serde::Deserialize, Clone)]
pub struct FormSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub success_dwell_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub error_dwell_ms: u64,
}

impl FormSettings {
    pub fn success_dwell(&self) -> Duration {
        Duration::from_millis(self.success_dwell_ms)
    }

    pub fn error_dwell(&self) -> Duration {
        Duration::from_millis(self.error_dwell_ms)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Default to `local` if APP_ENVIRONMENT has not been set
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // e.g. APP_RELAY__ENDPOINT overrides relay.endpoint
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
