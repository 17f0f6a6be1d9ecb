//! Configuration module for cwsql.
//!
//! Handles feature flags, dashboard variables and environment variables.

mod settings;

pub use settings::{expand_env_vars, FeatureSettings, Settings, SettingsError};
