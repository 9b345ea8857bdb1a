use std::sync::Arc;

use crate::constants::PRICES_PATH;
use crate::error::{ClientError, ClientResult};
use crate::models::{PriceRecord, PriceRequest, PriceResponse};
use crate::session::Session;
use crate::transport::Transport;

const FETCH_FAILED: &str = "Failed to fetch price.";
const FETCH_ERROR: &str = "Error fetching price.";

/// Crop market prices, memoized per crop for the session.
pub struct PriceLookup {
    transport: Arc<dyn Transport>,
}

impl PriceLookup {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Returns the cached record for `crop`, fetching it on first use.
    pub async fn get_price(&self, session: &Session, crop: &str) -> ClientResult<PriceRecord> {
        if let Some(record) = session.cached_price(crop).await {
            tracing::debug!("Price cache hit for {}", crop);
            return Ok(record);
        }

        tracing::info!("Fetching price for {}", crop);
        let body = serde_json::to_value(PriceRequest { crop })
            .map_err(|e| ClientError::Validation(format!("Invalid crop name: {}", e)))?;
        let response = self
            .transport
            .post_json(PRICES_PATH, &body)
            .await
            .map_err(|e| {
                tracing::warn!("Price request for {} failed: {}", crop, e);
                ClientError::Transport(FETCH_ERROR.to_string())
            })?;

        let backend_error = || {
            ClientError::Backend(
                response
                    .error_message()
                    .unwrap_or_else(|| FETCH_FAILED.to_string()),
            )
        };

        if !response.is_success() {
            return Err(backend_error());
        }

        let parsed: PriceResponse =
            serde_json::from_value(response.body.clone()).unwrap_or_default();
        let (Some(min), Some(modal), Some(max)) = (parsed.min, parsed.modal, parsed.max) else {
            return Err(backend_error());
        };

        Ok(session.store_price(crop, PriceRecord { min, modal, max }).await)
    }
}
