use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::config::Config;
use crate::constants::UNKNOWN_REGION;
use crate::error::{ClientError, ClientResult};
use crate::formatters::{format_price, format_recommendations};
use crate::location::{compose_region_string, FixedGeolocator, Geolocator, LocationResolver};
use crate::models::{
    Coordinates, GetCropPriceRequest, GetWeatherRequest, RecommendCropsRequest,
    TrackLocationRequest,
};
use crate::prices::PriceLookup;
use crate::recommend::{FormState, RecommendationClient};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use crate::weather::{PanelContent, WeatherDashboard, WeatherOutcome, WeatherView};

/// Crop advisor client exposed as MCP tools, one per panel action
#[derive(Clone)]
pub struct CropAdvisor {
    session: Arc<Session>,
    resolver: Arc<LocationResolver>,
    prices: Arc<PriceLookup>,
    recommendations: Arc<RecommendationClient>,
    weather: Arc<WeatherDashboard>,
    tool_router: ToolRouter<Self>,
}

impl CropAdvisor {
    /// Creates a client talking to the configured backend over HTTP
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(
            config.backend_url.clone(),
            config.request_timeout,
        )?);
        let geolocator = Arc::new(FixedGeolocator::new(config.device_position));
        Ok(Self::with_parts(config, transport, geolocator))
    }

    /// Creates a client over explicit transport and position sources
    pub fn with_parts(
        config: &Config,
        transport: Arc<dyn Transport>,
        geolocator: Arc<dyn Geolocator>,
    ) -> Self {
        let resolver = Arc::new(LocationResolver::new(
            transport.clone(),
            geolocator,
            config.geocoder_url.clone(),
        ));

        Self {
            session: Arc::new(Session::new(config.charts_enabled)),
            prices: Arc::new(PriceLookup::new(transport.clone())),
            recommendations: Arc::new(RecommendationClient::new(transport.clone())),
            weather: Arc::new(WeatherDashboard::new(transport, resolver.clone())),
            resolver,
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Initial weather load, run once when the session starts
    pub async fn on_page_load(&self) -> WeatherOutcome {
        self.weather.load_and_render(&self.session).await
    }

    /// Resolves the position and returns the region text for the form
    pub async fn track_location_panel(
        &self,
        request: TrackLocationRequest,
    ) -> ClientResult<String> {
        let resolved = match (request.latitude, request.longitude) {
            (Some(latitude), Some(longitude)) => {
                let device = FixedGeolocator::new(Some(Coordinates {
                    latitude,
                    longitude,
                }));
                self.resolver.resolve_from(&self.session, &device).await
            }
            (None, None) => self.resolver.resolve(&self.session).await,
            _ => {
                return Err(ClientError::Validation(
                    "Provide both latitude and longitude.".to_string(),
                ))
            }
        };
        let (coordinates, place) = resolved?;

        let region = compose_region_string(&place);
        Ok(format!(
            "Region: {}\nCoordinates: {:.4}, {:.4}\n",
            if region.is_empty() { UNKNOWN_REGION } else { region.as_str() },
            coordinates.latitude,
            coordinates.longitude
        ))
    }

    pub async fn crop_price_panel(&self, crop: &str) -> ClientResult<String> {
        let record = self.prices.get_price(&self.session, crop).await?;
        Ok(format_price(crop, &record))
    }

    pub async fn recommendation_panel(&self, form: &FormState) -> ClientResult<String> {
        let recommendations = self.recommendations.submit(&self.session, form).await?;
        Ok(format_recommendations(recommendations.as_deref()))
    }

    /// Returns the displayed weather summary, loading one when asked or when
    /// the panel shows nothing or an error
    pub async fn weather_panel(&self, refresh: bool) -> WeatherOutcome {
        if !refresh {
            if let Some(view) = self.session.weather_view().await {
                if !view.is_error() {
                    return WeatherOutcome {
                        view,
                        published: true,
                    };
                }
            }
        }
        self.weather.load_and_render(&self.session).await
    }

    fn panel_result(
        result: ClientResult<String>,
        failure: fn(&ClientError) -> String,
    ) -> CallToolResult {
        match result {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => CallToolResult::error(vec![Content::text(failure(&e))]),
        }
    }

    fn weather_result(outcome: WeatherOutcome) -> Result<CallToolResult, McpError> {
        let WeatherOutcome { view, published } = outcome;
        let WeatherView {
            heading,
            content,
            chart,
        } = view;

        let note = if published {
            ""
        } else {
            "\n(Superseded by a newer weather request; not displayed.)\n"
        };

        match content {
            PanelContent::Error(message) => Ok(CallToolResult::error(vec![Content::text(format!(
                "{}:\n\n{}\n{}",
                heading, message, note
            ))])),
            PanelContent::Summary(summary) => {
                let mut contents =
                    vec![Content::text(format!("{}:\n\n{}{}", heading, summary, note))];
                if let Some(chart) = chart {
                    let json = serde_json::to_string_pretty(&chart).map_err(|e| {
                        McpError::internal_error(format!("Failed to encode chart: {}", e), None)
                    })?;
                    contents.push(Content::text(json));
                }
                Ok(CallToolResult::success(contents))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for CropAdvisor {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-crop-advisor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "An agricultural advisor backed by a crop recommendation service. \
                Recommends crops for a plot of land, looks up crop market prices, \
                detects the farmer's region and shows the local weather."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl CropAdvisor {
    /// Detects the current region
    #[tool(description = "Detect the farmer's region from the device position. Optionally pass the latitude and longitude reported by your device. Returns a 'place, district, state' region string to use in recommendations.")]
    async fn track_location(
        &self,
        Parameters(request): Parameters<TrackLocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Tracking location");

        let result = self.track_location_panel(request).await;
        Ok(Self::panel_result(result, ClientError::track_location_message))
    }

    /// Looks up crop market prices
    #[tool(description = "Get the minimum, modal and maximum market price of a crop (e.g., 'wheat', 'rice', 'onion'). Prices are cached for the session.")]
    async fn get_crop_price(
        &self,
        Parameters(request): Parameters<GetCropPriceRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting price for crop: {}", request.crop);

        let result = self.crop_price_panel(&request.crop).await;
        Ok(Self::panel_result(result, |e| e.to_string()))
    }

    /// Requests crop recommendations
    #[tool(description = "Recommend crops for a plot of land. Provide the land area in acres, the water price per liter, optionally the region (defaults to the detected location) and optionally a path to a photo of the land.")]
    async fn recommend_crops(
        &self,
        Parameters(request): Parameters<RecommendCropsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let form = FormState::from(request);
        tracing::info!("Submitting recommendation form for region '{}'", form.region);

        let result = self.recommendation_panel(&form).await;
        Ok(Self::panel_result(result, |e| e.to_string()))
    }

    /// Shows the weather dashboard
    #[tool(description = "Show current weather for the detected location: temperature, rain, wind and soil moisture, plus an hourly chart configuration. Set refresh to true to fetch fresh data.")]
    async fn get_weather(
        &self,
        Parameters(request): Parameters<GetWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting weather (refresh: {})", request.refresh);

        let outcome = self.weather_panel(request.refresh).await;
        Self::weather_result(outcome)
    }
}
