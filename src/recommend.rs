//! Recommendation submission: form → `/recommend` → ranked crop list.

use base64::engine::general_purpose;
use base64::Engine;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::RECOMMEND_PATH;
use crate::error::{ClientError, ClientResult};
use crate::models::{FormValue, RecommendPayload, Recommendation, RecommendCropsRequest};
use crate::session::Session;
use crate::transport::Transport;

const GENERIC_ERROR: &str = "An error occurred.";
const FETCH_FAILED: &str = "Failed to fetch recommendation.";

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub land_area_acres: FormValue,
    pub region: String,
    pub water_price_per_liter: FormValue,
    pub image: Option<PathBuf>,
}

impl From<RecommendCropsRequest> for FormState {
    fn from(request: RecommendCropsRequest) -> Self {
        Self {
            land_area_acres: request.land_area_acres,
            region: request.region.unwrap_or_default(),
            water_price_per_liter: request.water_price_per_liter,
            image: request.image_path.map(PathBuf::from),
        }
    }
}

/// Reads a numeric form field; the value must be a finite number.
pub fn parse_number(field: &str, value: &FormValue) -> ClientResult<f64> {
    let parsed = match value {
        FormValue::Number(n) => Some(*n),
        FormValue::Text(text) => text.trim().parse::<f64>().ok(),
    };
    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| ClientError::Validation(format!("{} must be a number.", field)))
}

/// Base64 of the file at `path`, without a data-URL prefix.
pub async fn encode_image(path: &Path) -> ClientResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::Image(format!("{}: {}", path.display(), e)))?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// The `crop_recommendations` list, if the body carries one.
pub fn recommendations_from_body(body: &Value) -> Option<Vec<Recommendation>> {
    let items = body.get("crop_recommendations")?.as_array()?;
    Some(
        items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
            .collect(),
    )
}

pub struct RecommendationClient {
    transport: Arc<dyn Transport>,
}

impl RecommendationClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Validates the form and encodes the attached image, if any.
    ///
    /// A blank region falls back to the tracked location.
    pub async fn build_payload(
        &self,
        session: &Session,
        form: &FormState,
    ) -> ClientResult<RecommendPayload> {
        let land_area_acres = parse_number("Land area", &form.land_area_acres)?;
        let water_price_per_liter = parse_number("Water price", &form.water_price_per_liter)?;

        let region = match form.region.trim() {
            "" => session.region_string().await,
            region => region.to_string(),
        };

        let image = match &form.image {
            Some(path) => Some(encode_image(path).await?),
            None => None,
        };

        Ok(RecommendPayload {
            land_area_acres,
            region,
            water_price_per_liter,
            image,
        })
    }

    /// Submits the form. `Ok(None)` means the backend sent no usable list.
    pub async fn submit(
        &self,
        session: &Session,
        form: &FormState,
    ) -> ClientResult<Option<Vec<Recommendation>>> {
        let payload = self.build_payload(session, form).await?;
        tracing::info!(
            "Requesting recommendations for {} acres in '{}' (image: {})",
            payload.land_area_acres,
            payload.region,
            payload.image.is_some()
        );

        let body = serde_json::to_value(&payload)
            .map_err(|e| ClientError::Validation(format!("Invalid form data: {}", e)))?;
        let response = self
            .transport
            .post_json(RECOMMEND_PATH, &body)
            .await
            .map_err(|e| {
                tracing::warn!("Recommendation request failed: {}", e);
                ClientError::Transport(FETCH_FAILED.to_string())
            })?;

        if !response.is_success() {
            return Err(ClientError::Backend(
                response
                    .error_message()
                    .unwrap_or_else(|| GENERIC_ERROR.to_string()),
            ));
        }

        Ok(recommendations_from_body(&response.body))
    }
}
