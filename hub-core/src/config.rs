//! Environment-based configuration.
//!
//! Required variables that are missing fail hard at startup; optional
//! subsystems (the Evolution upstream) stay disabled when none of their
//! variables are set, but a partial configuration is treated as an error
//! naming what is missing.

use std::env;

pub const DEFAULT_RELAY_URL: &str = "ws://localhost:9001";
pub const DEFAULT_DB_PATH: &str = "hub.db";

/// Evolution (WhatsApp) API endpoint configuration.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    pub api_url: String,
    pub instance_id: String,
    pub api_key: String,
}

impl EvolutionConfig {
    /// Build from the three variable values. Returns `Ok(None)` when all are
    /// absent (upstream disabled) and an error naming the missing variables
    /// when only some are set.
    pub fn from_vars(
        api_url: Option<String>,
        instance_id: Option<String>,
        api_key: Option<String>,
    ) -> Result<Option<Self>, String> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !present(&api_url) && !present(&instance_id) && !present(&api_key) {
            return Ok(None);
        }

        let mut missing = Vec::new();
        if !present(&api_url) {
            missing.push("EVOLUTION_API_URL");
        }
        if !present(&instance_id) {
            missing.push("EVOLUTION_INSTANCE_ID");
        }
        if !present(&api_key) {
            missing.push("EVOLUTION_API_KEY");
        }
        if !missing.is_empty() {
            return Err(format!(
                "Evolution API environment variables are not configured. Missing: {}",
                missing.join(", ")
            ));
        }

        Ok(Some(Self {
            api_url: api_url.unwrap_or_default(),
            instance_id: instance_id.unwrap_or_default(),
            api_key: api_key.unwrap_or_default(),
        }))
    }

    pub fn from_env() -> Result<Option<Self>, String> {
        Self::from_vars(
            env::var("EVOLUTION_API_URL").ok(),
            env::var("EVOLUTION_INSTANCE_ID").ok(),
            env::var("EVOLUTION_API_KEY").ok(),
        )
    }

    /// Instance-scoped base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}/instances/{}",
            self.api_url.trim_end_matches('/'),
            self.instance_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub evolution: Option<EvolutionConfig>,
    pub relay_url: String,
    pub db_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        // Best-effort .env load; absence is fine
        let _ = dotenvy::dotenv();

        Ok(Self {
            evolution: EvolutionConfig::from_env()?,
            relay_url: env::var("HUB_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string()),
            db_path: env::var("HUB_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
        })
    }
}
