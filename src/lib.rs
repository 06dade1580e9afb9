pub mod analytics;
pub mod configuration;
pub mod controller;
pub mod domain;
pub mod relay;
pub mod telemetry;
