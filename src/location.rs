//! Location resolver: device position plus reverse geocoding.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{ClientError, ClientResult};
use crate::models::{Coordinates, GeocodeAddress, PlaceInfo, ReverseGeocodeResponse};
use crate::session::Session;
use crate::transport::Transport;

/// Single-shot source of the device's position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> ClientResult<Coordinates>;
}

/// Reports a position known up front, or no capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> ClientResult<Coordinates> {
        match self.position {
            None => Err(ClientError::CapabilityUnavailable),
            Some(c) if !c.is_valid() => Err(ClientError::PositionUnavailable(format!(
                "reported position {}, {} is out of range",
                c.latitude, c.longitude
            ))),
            Some(c) => Ok(c),
        }
    }
}

/// Joins the known parts of `place` as "place, district, state".
pub fn compose_region_string(place: &PlaceInfo) -> String {
    [&place.place_name, &place.district, &place.state]
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_non_empty(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Locality is the most specific settlement the geocoder names.
pub fn place_from_address(address: &GeocodeAddress) -> PlaceInfo {
    PlaceInfo {
        place_name: first_non_empty(&[
            &address.city,
            &address.town,
            &address.village,
            &address.hamlet,
        ]),
        district: first_non_empty(&[&address.state_district, &address.county]),
        state: first_non_empty(&[&address.state]),
    }
}

pub struct LocationResolver {
    transport: Arc<dyn Transport>,
    geolocator: Arc<dyn Geolocator>,
    geocoder_url: String,
}

impl LocationResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        geolocator: Arc<dyn Geolocator>,
        geocoder_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            geolocator,
            geocoder_url: geocoder_url.into(),
        }
    }

    /// Reverse-geocodes `coordinates`. Never fails: problems yield an empty place.
    pub async fn geocode(&self, coordinates: Coordinates) -> PlaceInfo {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.geocoder_url, coordinates.latitude, coordinates.longitude
        );

        let response = match self.transport.get_json(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                return PlaceInfo::default();
            }
        };

        match serde_json::from_value::<ReverseGeocodeResponse>(response.body) {
            Ok(parsed) => parsed
                .address
                .map(|address| place_from_address(&address))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Unexpected reverse geocoding payload: {}", e);
                PlaceInfo::default()
            }
        }
    }

    /// Resolves the device position through the configured geolocator.
    pub async fn resolve(&self, session: &Session) -> ClientResult<(Coordinates, PlaceInfo)> {
        self.resolve_from(session, self.geolocator.as_ref()).await
    }

    /// Asks `geolocator` once, records the position, then records its place.
    pub async fn resolve_from(
        &self,
        session: &Session,
        geolocator: &dyn Geolocator,
    ) -> ClientResult<(Coordinates, PlaceInfo)> {
        let coordinates = geolocator.current_position().await.map_err(|e| {
            tracing::warn!("Position request failed: {}", e);
            e
        })?;
        session.set_coordinates(coordinates).await;
        tracing::info!(
            "Position resolved: {}, {}",
            coordinates.latitude,
            coordinates.longitude
        );

        let place = self.geocode(coordinates).await;
        session.set_place(place.clone()).await;
        Ok((coordinates, place))
    }
}
