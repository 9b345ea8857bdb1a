//! Session store: the only place that owns shared state.
//!
//! Last known position and place, the price cache, the weather panel's
//! request counter and published view, and the chart host all live behind a
//! single lock. The lock is never held across an `.await`.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::chart::{ChartHost, ChartInstance};
use crate::constants::WEATHER_CHART_MOUNT;
use crate::location::compose_region_string;
use crate::models::{Coordinates, PlaceInfo, PriceRecord};
use crate::weather::WeatherView;

#[derive(Debug)]
struct SessionState {
    coordinates: Option<Coordinates>,
    place: PlaceInfo,
    prices: HashMap<String, PriceRecord>,
    weather_issued: u64,
    weather_view: Option<WeatherView>,
    charts: ChartHost,
}

#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// `charts_available` is the charting capability for the whole session.
    pub fn new(charts_available: bool) -> Self {
        Self {
            state: Mutex::new(SessionState {
                coordinates: None,
                place: PlaceInfo::default(),
                prices: HashMap::new(),
                weather_issued: 0,
                weather_view: None,
                charts: ChartHost::new(charts_available),
            }),
        }
    }

    pub async fn coordinates(&self) -> Option<Coordinates> {
        self.state.lock().await.coordinates
    }

    pub async fn set_coordinates(&self, coordinates: Coordinates) {
        self.state.lock().await.coordinates = Some(coordinates);
    }

    pub async fn set_place(&self, place: PlaceInfo) {
        self.state.lock().await.place = place;
    }

    pub async fn region_string(&self) -> String {
        compose_region_string(&self.state.lock().await.place)
    }

    pub async fn cached_price(&self, crop: &str) -> Option<PriceRecord> {
        self.state.lock().await.prices.get(crop).copied()
    }

    /// Stores `record` unless the crop already has an entry; returns the entry.
    pub async fn store_price(&self, crop: &str, record: PriceRecord) -> PriceRecord {
        *self
            .state
            .lock()
            .await
            .prices
            .entry(crop.to_string())
            .or_insert(record)
    }

    pub async fn cached_price_count(&self) -> usize {
        self.state.lock().await.prices.len()
    }

    /// Issues the next weather request number.
    pub async fn begin_weather_request(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.weather_issued += 1;
        state.weather_issued
    }

    /// Publishes `view` if `ticket` is still the latest weather request.
    ///
    /// A published view mounts its chart on the weather mount point, or
    /// tears down the previous chart when it has none.
    pub async fn publish_weather(&self, ticket: u64, view: &WeatherView) -> bool {
        let mut state = self.state.lock().await;
        if ticket != state.weather_issued {
            tracing::debug!(
                "Dropping weather response {} superseded by {}",
                ticket,
                state.weather_issued
            );
            return false;
        }

        match &view.chart {
            Some(spec) => {
                state.charts.mount(WEATHER_CHART_MOUNT, spec.clone());
            }
            None => {
                state.charts.destroy(WEATHER_CHART_MOUNT);
            }
        }
        state.weather_view = Some(view.clone());
        true
    }

    pub async fn weather_view(&self) -> Option<WeatherView> {
        self.state.lock().await.weather_view.clone()
    }

    pub async fn charts_available(&self) -> bool {
        self.state.lock().await.charts.is_available()
    }

    pub async fn chart_instance(&self, mount: &str) -> Option<ChartInstance> {
        self.state.lock().await.charts.instance(mount).cloned()
    }

    pub async fn charts_destroyed(&self) -> u64 {
        self.state.lock().await.charts.destroyed_count()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true)
    }
}
