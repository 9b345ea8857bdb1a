//! Weather dashboard.
//!
//! Loading is an explicit state machine fed by an event queue:
//!
//! ```text
//! AwaitingLocation --PositionResolved--> Fetching --SeriesReceived--> Displayed
//!        |                                   |
//!        +--PositionFailed--> Error <--------+--FetchFailed
//! ```
//!
//! A load that starts with cached coordinates skips straight to `Fetching`.
//! Every load takes a fresh request number from the session and only the
//! latest one may publish its view.

use chrono::{FixedOffset, NaiveDateTime, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::chart::ChartSpec;
use crate::constants::{IST_OFFSET_SECS, IST_SUFFIX, WEATHER_PATH, WEATHER_TIME_FORMAT};
use crate::error::ClientError;
use crate::formatters::{format_weather_heading, format_weather_summary};
use crate::location::LocationResolver;
use crate::models::{Coordinates, WeatherSeries};
use crate::session::Session;
use crate::transport::Transport;

const INCOMPLETE_SERIES: &str = "Weather data is incomplete.";

/// Parses a backend timestamp such as `"Mon, 19 Oct 2026 13:00:00 IST"`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let raw = raw
        .strip_suffix(IST_SUFFIX.trim_start())
        .map(str::trim_end)
        .unwrap_or(raw);
    NaiveDateTime::parse_from_str(raw, WEATHER_TIME_FORMAT).ok()
}

/// Wall-clock time in Indian Standard Time.
pub fn now_ist() -> NaiveDateTime {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => Utc::now().with_timezone(&ist).naive_local(),
        None => Utc::now().naive_utc(),
    }
}

/// Index of the latest sample not after `now`, or 0 if every sample is later.
///
/// Samples are scanned in order and the scan stops at the first one after
/// `now`. Unparseable timestamps are skipped.
pub fn current_index(dates: &[String], now: NaiveDateTime) -> usize {
    let mut index = 0;
    for (i, raw) in dates.iter().enumerate() {
        match parse_timestamp(raw) {
            Some(t) if t > now => break,
            Some(_) => index = i,
            None => continue,
        }
    }
    index
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    AwaitingLocation,
    Fetching(Coordinates),
    Displayed { series: WeatherSeries, index: usize },
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Load or refresh, with whatever coordinates the session already has.
    Start(Option<Coordinates>),
    PositionResolved(Coordinates),
    PositionFailed(ClientError),
    SeriesReceived(WeatherSeries),
    FetchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ResolvePosition,
    FetchSeries(Coordinates),
}

/// Advances the dashboard by one event.
pub fn step(
    state: DashboardState,
    event: DashboardEvent,
    now: NaiveDateTime,
) -> (DashboardState, Option<Command>) {
    use DashboardEvent as E;
    use DashboardState as S;

    match (state, event) {
        (_, E::Start(Some(c))) => (S::Fetching(c), Some(Command::FetchSeries(c))),
        (_, E::Start(None)) => (S::AwaitingLocation, Some(Command::ResolvePosition)),
        (S::AwaitingLocation, E::PositionResolved(c)) => {
            (S::Fetching(c), Some(Command::FetchSeries(c)))
        }
        (S::AwaitingLocation, E::PositionFailed(e)) => (S::Error(e.weather_message()), None),
        (S::Fetching(_), E::SeriesReceived(series)) => {
            if !series.is_consistent() {
                return (S::Error(INCOMPLETE_SERIES.to_string()), None);
            }
            let index = current_index(&series.date, now);
            (S::Displayed { series, index }, None)
        }
        (S::Fetching(_), E::FetchFailed(message)) => (S::Error(message), None),
        (state, event) => {
            tracing::warn!("Ignoring {:?} in state {:?}", event, state);
            (state, None)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Summary(String),
    Error(String),
}

/// What the weather panel shows after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub heading: String,
    pub content: PanelContent,
    pub chart: Option<ChartSpec>,
}

impl WeatherView {
    pub fn error(heading: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: PanelContent::Error(message.into()),
            chart: None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, PanelContent::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherOutcome {
    pub view: WeatherView,
    /// False when a newer load was issued before this one finished.
    pub published: bool,
}

pub struct WeatherDashboard {
    transport: Arc<dyn Transport>,
    resolver: Arc<LocationResolver>,
}

impl WeatherDashboard {
    pub fn new(transport: Arc<dyn Transport>, resolver: Arc<LocationResolver>) -> Self {
        Self {
            transport,
            resolver,
        }
    }

    /// Runs one load to completion and publishes the view if still current.
    pub async fn load_and_render(&self, session: &Session) -> WeatherOutcome {
        let ticket = session.begin_weather_request().await;
        tracing::info!("Loading weather (request {})", ticket);

        let mut state = DashboardState::AwaitingLocation;
        let mut queue = VecDeque::from([DashboardEvent::Start(session.coordinates().await)]);

        while let Some(event) = queue.pop_front() {
            let (next, command) = step(state, event, now_ist());
            state = next;
            if let Some(command) = command {
                queue.push_back(self.execute(command, session).await);
            }
        }

        let view = self.render(session, state).await;
        let published = session.publish_weather(ticket, &view).await;
        if let PanelContent::Error(message) = &view.content {
            tracing::warn!("Weather request {} failed: {}", ticket, message);
        }

        WeatherOutcome { view, published }
    }

    async fn execute(&self, command: Command, session: &Session) -> DashboardEvent {
        match command {
            Command::ResolvePosition => match self.resolver.resolve(session).await {
                Ok((coordinates, _)) => DashboardEvent::PositionResolved(coordinates),
                Err(e) => DashboardEvent::PositionFailed(e),
            },
            Command::FetchSeries(coordinates) => self.fetch_series(coordinates).await,
        }
    }

    async fn fetch_series(&self, coordinates: Coordinates) -> DashboardEvent {
        let body = json!({
            "latitude": coordinates.latitude,
            "longitude": coordinates.longitude,
        });

        let response = match self.transport.post_json(WEATHER_PATH, &body).await {
            Ok(response) => response,
            Err(e) => return DashboardEvent::FetchFailed(format!("Weather fetch error: {}", e)),
        };

        if let Some(message) = response.error_message() {
            return DashboardEvent::FetchFailed(message);
        }
        if !response.is_success() {
            return DashboardEvent::FetchFailed(format!(
                "Weather fetch error: request failed with status {}",
                response.status
            ));
        }

        match serde_json::from_value::<WeatherSeries>(response.body) {
            Ok(series) => DashboardEvent::SeriesReceived(series),
            Err(e) => DashboardEvent::FetchFailed(format!("Weather fetch error: {}", e)),
        }
    }

    async fn render(&self, session: &Session, state: DashboardState) -> WeatherView {
        let region = session.region_string().await;
        let heading = format_weather_heading(&region);

        match state {
            DashboardState::Displayed { series, index } => {
                let chart = if session.charts_available().await {
                    Some(ChartSpec::from_series(&series))
                } else {
                    None
                };
                WeatherView {
                    heading,
                    content: PanelContent::Summary(format_weather_summary(
                        &region, &series, index,
                    )),
                    chart,
                }
            }
            DashboardState::Error(message) => WeatherView::error(heading, message),
            other => {
                tracing::error!("Weather load stopped early in state {:?}", other);
                WeatherView::error(heading, "Weather data is unavailable.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stamp(t: NaiveDateTime) -> String {
        format!("{}{}", t.format(WEATHER_TIME_FORMAT), IST_SUFFIX)
    }

    fn now() -> NaiveDateTime {
        parse_timestamp("Mon, 19 Oct 2026 12:30:00 IST").unwrap()
    }

    fn series(dates: Vec<String>) -> WeatherSeries {
        let n = dates.len();
        WeatherSeries {
            date: dates,
            temperature_2m: vec![Some(25.0); n],
            rain: vec![Some(0.0); n],
            wind_speed_10m: vec![Some(2.0); n],
            soil_moisture_0_to_1cm: vec![Some(0.3); n],
            ..Default::default()
        }
    }

    const PUNE: Coordinates = Coordinates {
        latitude: 18.52,
        longitude: 73.85,
    };

    #[test]
    fn parses_backend_timestamps() {
        let t = parse_timestamp("Sat, 01 Jun 2024 06:00:00 IST").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2024-06-01 06:00");
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn picks_last_sample_not_after_now() {
        let n = now();
        let dates = vec![
            stamp(n - Duration::hours(2)),
            stamp(n - Duration::hours(1)),
            stamp(n + Duration::hours(1)),
        ];
        assert_eq!(current_index(&dates, n), 1);
    }

    #[test]
    fn all_future_samples_pick_first() {
        let n = now();
        let dates = vec![stamp(n + Duration::hours(1)), stamp(n + Duration::hours(2))];
        assert_eq!(current_index(&dates, n), 0);
    }

    #[test]
    fn sample_exactly_now_is_current() {
        let n = now();
        let dates = vec![
            stamp(n - Duration::hours(1)),
            stamp(n),
            stamp(n + Duration::hours(1)),
        ];
        assert_eq!(current_index(&dates, n), 1);
    }

    #[test]
    fn start_without_coordinates_resolves_first() {
        let (state, command) = step(
            DashboardState::AwaitingLocation,
            DashboardEvent::Start(None),
            now(),
        );
        assert_eq!(state, DashboardState::AwaitingLocation);
        assert_eq!(command, Some(Command::ResolvePosition));

        let (state, command) = step(state, DashboardEvent::PositionResolved(PUNE), now());
        assert_eq!(state, DashboardState::Fetching(PUNE));
        assert_eq!(command, Some(Command::FetchSeries(PUNE)));
    }

    #[test]
    fn start_with_cached_coordinates_fetches_directly() {
        let (state, command) = step(
            DashboardState::AwaitingLocation,
            DashboardEvent::Start(Some(PUNE)),
            now(),
        );
        assert_eq!(state, DashboardState::Fetching(PUNE));
        assert_eq!(command, Some(Command::FetchSeries(PUNE)));
    }

    #[test]
    fn position_failures_become_errors() {
        let (state, command) = step(
            DashboardState::AwaitingLocation,
            DashboardEvent::PositionFailed(ClientError::PositionUnavailable("denied".into())),
            now(),
        );
        assert_eq!(
            state,
            DashboardState::Error("Geolocation failed. Cannot fetch weather.".into())
        );
        assert!(command.is_none());

        let (state, _) = step(
            DashboardState::AwaitingLocation,
            DashboardEvent::PositionFailed(ClientError::CapabilityUnavailable),
            now(),
        );
        assert!(matches!(state, DashboardState::Error(m) if m.contains("not supported")));
    }

    #[test]
    fn ragged_series_is_an_error() {
        let mut s = series(vec![stamp(now())]);
        s.rain.clear();
        let (state, _) = step(
            DashboardState::Fetching(PUNE),
            DashboardEvent::SeriesReceived(s),
            now(),
        );
        assert_eq!(state, DashboardState::Error(INCOMPLETE_SERIES.into()));
    }

    #[test]
    fn received_series_is_displayed_at_current_index() {
        let n = now();
        let s = series(vec![stamp(n - Duration::hours(1)), stamp(n + Duration::hours(1))]);
        let (state, command) = step(
            DashboardState::Fetching(PUNE),
            DashboardEvent::SeriesReceived(s.clone()),
            n,
        );
        assert_eq!(state, DashboardState::Displayed { series: s, index: 0 });
        assert!(command.is_none());
    }

    #[test]
    fn out_of_order_events_are_ignored() {
        let (state, command) = step(
            DashboardState::Error("x".into()),
            DashboardEvent::PositionResolved(PUNE),
            now(),
        );
        assert_eq!(state, DashboardState::Error("x".into()));
        assert!(command.is_none());
    }
}
