use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Session Data Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// True when both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Human-readable place descriptor; empty string means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceInfo {
    pub place_name: String,
    pub district: String,
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub min: f64,
    pub modal: f64,
    pub max: f64,
}

// ============================================================================
// Backend API Models
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PriceRequest<'a> {
    pub crop: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceResponse {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub min: Option<f64>,
    #[serde(rename = "mod", default, deserialize_with = "lenient::amount")]
    pub modal: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendPayload {
    pub land_area_acres: f64,
    pub region: String,
    pub water_price_per_liter: f64,
    /// Base64 without a `data:` prefix; serialized as `null` when absent
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub crop_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub best_seeds: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub required_tools: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub estimated_cost_per_year: Option<CostEstimate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CostEstimate {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub breakdown: Option<CostBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CostBreakdown {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub seeds: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub water: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub fertilizer: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub tools_and_equipment: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub labor: Option<f64>,
}

/// Hourly series from `/weather`; index `i` of every array is one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub rain: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_0_to_1cm: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture_1_to_3cm: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showers: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall: Option<Vec<Option<f64>>>,
}

impl WeatherSeries {
    /// Non-empty, with every displayed column the same length as `date`.
    pub fn is_consistent(&self) -> bool {
        let n = self.date.len();
        n > 0
            && self.temperature_2m.len() == n
            && self.rain.len() == n
            && self.wind_speed_10m.len() == n
            && self.soil_moisture_0_to_1cm.len() == n
    }
}

// ============================================================================
// Reverse Geocoding Models
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub address: Option<GeocodeAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub state_district: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

/// A form field that may arrive as a JSON number or as typed text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct TrackLocationRequest {
    /// Latitude reported by the caller's device, if it has one
    pub latitude: Option<f64>,
    /// Longitude reported by the caller's device, if it has one
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetCropPriceRequest {
    pub crop: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct RecommendCropsRequest {
    pub land_area_acres: FormValue,
    /// Region text; the tracked location is used when omitted
    pub region: Option<String>,
    pub water_price_per_liter: FormValue,
    /// Path to an optional photo of the land
    pub image_path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetWeatherRequest {
    /// Fetch fresh data even when a dashboard is already displayed
    #[serde(default)]
    pub refresh: bool,
}

/// Tolerant field decoders for backend payloads produced by a language model.
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Numbers or numeric strings; anything else is absent.
    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(amount_from_value(&value))
    }

    pub fn amount_from_value(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|v| v.is_finite())
    }

    /// Non-empty text; numbers are stringified.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_response_maps_mod_to_modal() {
        let parsed: PriceResponse =
            serde_json::from_value(json!({"min": 1800, "mod": "2000", "max": 2250.5})).unwrap();
        assert_eq!(parsed.min, Some(1800.0));
        assert_eq!(parsed.modal, Some(2000.0));
        assert_eq!(parsed.max, Some(2250.5));
        assert!(parsed.error.is_none());
    }

    #[test]
    fn recommendation_tolerates_odd_shapes() {
        let rec: Recommendation = serde_json::from_value(json!({
            "crop_name": "Millet",
            "reasoning": "",
            "best_seeds": "HHB-67",
            "required_tools": ["Hoe", 3],
            "estimated_cost_per_year": {"total_cost": "", "breakdown": [1, 2]}
        }))
        .unwrap();

        assert_eq!(rec.crop_name.as_deref(), Some("Millet"));
        assert!(rec.reasoning.is_none());
        assert!(rec.best_seeds.is_none());
        assert_eq!(
            rec.required_tools,
            Some(vec!["Hoe".to_string(), "3".to_string()])
        );
        let cost = rec.estimated_cost_per_year.unwrap();
        assert!(cost.total_cost.is_none());
        assert!(cost.breakdown.is_none());
    }

    #[test]
    fn price_request_body() {
        let body = serde_json::to_value(PriceRequest { crop: "onion" }).unwrap();
        assert_eq!(body, json!({"crop": "onion"}));
    }

    #[test]
    fn payload_without_image_serializes_null() {
        let payload = RecommendPayload {
            land_area_acres: 2.0,
            region: "Pune".into(),
            water_price_per_liter: 0.05,
            image: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["image"].is_null());
    }

    #[test]
    fn weather_series_consistency() {
        let mut series = WeatherSeries {
            date: vec!["a".into(), "b".into()],
            temperature_2m: vec![Some(20.0), Some(21.0)],
            rain: vec![Some(0.0), None],
            wind_speed_10m: vec![Some(1.0), Some(2.0)],
            soil_moisture_0_to_1cm: vec![Some(0.3), Some(0.31)],
            ..Default::default()
        };
        assert!(series.is_consistent());
        series.rain.pop();
        assert!(!series.is_consistent());
        assert!(!WeatherSeries::default().is_consistent());
    }

    #[test]
    fn coordinate_bounds() {
        let at = |latitude, longitude| Coordinates {
            latitude,
            longitude,
        };
        assert!(at(18.5, 73.8).is_valid());
        assert!(!at(95.0, 0.0).is_valid());
        assert!(!at(f64::NAN, 0.0).is_valid());
    }
}
