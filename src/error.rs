//! Failure taxonomy shared by every panel.
//!
//! Each variant carries (or implies) the message shown inline in the panel
//! that triggered the failure; nothing here is fatal to the session.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The host has no way to report its position.
    #[error("Geolocation is not supported on this device.")]
    CapabilityUnavailable,

    /// The position request was denied or failed.
    #[error("Geolocation failed: {0}")]
    PositionUnavailable(String),

    /// Non-success status or an explicit `error` field from the backend.
    #[error("{0}")]
    Backend(String),

    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),

    /// Form input that cannot be sent as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Could not read image: {0}")]
    Image(String),
}

impl ClientError {
    /// Message rendered when the location button fails.
    pub fn track_location_message(&self) -> String {
        match self {
            Self::PositionUnavailable(_) => {
                "Geolocation failed. Please enter your region manually.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Message rendered in the weather panel when the location step fails.
    pub fn weather_message(&self) -> String {
        match self {
            Self::PositionUnavailable(_) => "Geolocation failed. Cannot fetch weather.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_failures_have_panel_specific_messages() {
        let err = ClientError::PositionUnavailable("denied".into());
        assert_eq!(
            err.weather_message(),
            "Geolocation failed. Cannot fetch weather."
        );
        assert_eq!(
            err.track_location_message(),
            "Geolocation failed. Please enter your region manually."
        );
    }

    #[test]
    fn capability_message_is_shared() {
        let err = ClientError::CapabilityUnavailable;
        assert_eq!(err.weather_message(), err.track_location_message());
        assert!(err.to_string().contains("not supported"));
    }
}
