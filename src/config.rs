//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file, all under the `CROP_ADVISOR_` prefix.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::constants::{DEFAULT_BACKEND_URL, NOMINATIM_API_BASE};
use crate::models::Coordinates;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the recommendation backend
    pub backend_url: String,

    /// Base URL of the reverse-geocoding service
    pub geocoder_url: String,

    /// Position reported by this device, if it has one
    pub device_position: Option<Coordinates>,

    /// Whether weather charts are produced alongside the summary
    pub charts_enabled: bool,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            geocoder_url: NOMINATIM_API_BASE.to_string(),
            device_position: None,
            charts_enabled: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads configuration from the environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("Failed to read .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_url = lookup("CROP_ADVISOR_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.backend_url);
        let geocoder_url = lookup("CROP_ADVISOR_GEOCODER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.geocoder_url);

        let latitude = lookup("CROP_ADVISOR_LATITUDE")
            .map(|v| v.trim().parse::<f64>())
            .transpose()
            .context("CROP_ADVISOR_LATITUDE must be a number")?;
        let longitude = lookup("CROP_ADVISOR_LONGITUDE")
            .map(|v| v.trim().parse::<f64>())
            .transpose()
            .context("CROP_ADVISOR_LONGITUDE must be a number")?;
        let device_position = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "CROP_ADVISOR_LATITUDE and CROP_ADVISOR_LONGITUDE must be set together"
            ),
        };

        let charts_enabled = match lookup("CROP_ADVISOR_CHARTS") {
            Some(v) => parse_flag(&v)
                .with_context(|| format!("CROP_ADVISOR_CHARTS has invalid value '{}'", v))?,
            None => defaults.charts_enabled,
        };

        let request_timeout = lookup("CROP_ADVISOR_TIMEOUT_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("CROP_ADVISOR_TIMEOUT_SECS must be a whole number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            backend_url,
            geocoder_url,
            device_position,
            charts_enabled,
            request_timeout,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
