use num_format::{Locale, ToFormattedString};

use crate::constants::{IST_SUFFIX, NO_RECOMMENDATIONS, PLACEHOLDER, PLACE_NAME_FAILED, RUPEE};
use crate::models::{PriceRecord, Recommendation, WeatherSeries};
use crate::weather::parse_timestamp;

/// Formats an amount with Indian digit grouping and a rupee sign.
///
/// Up to three fractional digits are kept, trailing zeros dropped. Absent or
/// non-finite amounts, and amounts whose whole part does not fit an `i128`,
/// render as `-`.
pub fn format_rupee(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite() && v.abs() < i128::MAX as f64) else {
        return PLACEHOLDER.to_string();
    };

    let abs = value.abs();
    let mut whole = abs.trunc() as i128;
    let mut fraction = (abs.fract() * 1000.0).round() as u32;
    if fraction == 1000 {
        whole += 1;
        fraction = 0;
    }

    let mut output = String::new();
    output.push(RUPEE);
    if value < 0.0 && (whole > 0 || fraction > 0) {
        output.push('-');
    }
    output.push_str(&whole.to_formatted_string(&Locale::en_IN));
    if fraction > 0 {
        let digits = format!("{:03}", fraction);
        output.push('.');
        output.push_str(digits.trim_end_matches('0'));
    }
    output
}

fn text_or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER)
}

fn list_or_placeholder(items: Option<&[String]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => PLACEHOLDER.to_string(),
    }
}

fn number_or_placeholder(value: Option<f64>, precision: Option<usize>) -> String {
    match (value.filter(|v| v.is_finite()), precision) {
        (Some(v), Some(p)) => format!("{:.*}", p, v),
        (Some(v), None) => v.to_string(),
        (None, _) => PLACEHOLDER.to_string(),
    }
}

/// Formats a cached market price into a human-readable string
pub fn format_price(crop: &str, price: &PriceRecord) -> String {
    format!(
        "Market Price for {}:\n  Minimum Price: {}\n  Modal Price: {}\n  Maximum Price: {}\n",
        crop,
        format_rupee(Some(price.min)),
        format_rupee(Some(price.modal)),
        format_rupee(Some(price.max))
    )
}

/// Formats crop recommendations, ranked in response order
pub fn format_recommendations(recommendations: Option<&[Recommendation]>) -> String {
    let recommendations = match recommendations {
        Some(recs) if !recs.is_empty() => recs,
        _ => return NO_RECOMMENDATIONS.to_string(),
    };

    let mut output = String::from("Crop Recommendations:\n\n");
    for (i, rec) in recommendations.iter().enumerate() {
        let cost = rec.estimated_cost_per_year.as_ref();
        let breakdown = cost.and_then(|c| c.breakdown.as_ref());

        output.push_str(&format!(
            "{}. {}\n  Reasoning: {}\n  Best Seeds: {}\n  Required Tools: {}\n",
            i + 1,
            text_or_placeholder(rec.crop_name.as_deref()),
            text_or_placeholder(rec.reasoning.as_deref()),
            list_or_placeholder(rec.best_seeds.as_deref()),
            list_or_placeholder(rec.required_tools.as_deref()),
        ));
        output.push_str(&format!(
            "  Estimated Cost (1 year):\n    Total: {}\n    Seeds: {}\n    Water: {}\n    Fertilizer: {}\n    Tools/Equipment: {}\n    Labor: {}\n\n",
            format_rupee(cost.and_then(|c| c.total_cost)),
            format_rupee(breakdown.and_then(|b| b.seeds)),
            format_rupee(breakdown.and_then(|b| b.water)),
            format_rupee(breakdown.and_then(|b| b.fertilizer)),
            format_rupee(breakdown.and_then(|b| b.tools_and_equipment)),
            format_rupee(breakdown.and_then(|b| b.labor)),
        ));
    }
    output
}

/// Title of the weather panel for the current region
pub fn format_weather_heading(region: &str) -> String {
    if region.is_empty() {
        "Current Weather".to_string()
    } else {
        format!("Current Weather in {}", region)
    }
}

/// Formats the sample at `index` as the weather panel summary
pub fn format_weather_summary(region: &str, series: &WeatherSeries, index: usize) -> String {
    let location = if region.is_empty() {
        PLACE_NAME_FAILED
    } else {
        region
    };
    let raw_time = series.date.get(index).map(String::as_str).unwrap_or_default();
    let time = match parse_timestamp(raw_time) {
        Some(t) => t.format("%d/%m/%Y, %H:%M:%S").to_string(),
        None => raw_time.trim_end_matches(IST_SUFFIX).to_string(),
    };
    let sample = |column: &[Option<f64>]| column.get(index).copied().flatten();

    format!(
        "Location: {}\nTime: {}{}\nTemperature: {}\u{00b0}C\nRain: {} mm\nWind: {} m/s\nSoil Moisture: {} m\u{00b3}/m\u{00b3}\n",
        location,
        time,
        IST_SUFFIX,
        number_or_placeholder(sample(&series.temperature_2m), Some(1)),
        number_or_placeholder(sample(&series.rain), None),
        number_or_placeholder(sample(&series.wind_speed_10m), None),
        number_or_placeholder(sample(&series.soil_moisture_0_to_1cm), Some(3)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostBreakdown, CostEstimate};

    #[test]
    fn rupee_uses_indian_grouping() {
        assert_eq!(format_rupee(Some(1234567.0)), "\u{20b9}12,34,567");
        assert_eq!(format_rupee(Some(999.0)), "\u{20b9}999");
        assert_eq!(format_rupee(Some(100000.0)), "\u{20b9}1,00,000");
        assert_eq!(format_rupee(Some(0.0)), "\u{20b9}0");
    }

    #[test]
    fn rupee_keeps_up_to_three_decimals() {
        assert_eq!(format_rupee(Some(1234.5)), "\u{20b9}1,234.5");
        assert_eq!(format_rupee(Some(0.12345)), "\u{20b9}0.123");
        assert_eq!(format_rupee(Some(-1500.0)), "\u{20b9}-1,500");
        assert_eq!(format_rupee(Some(9.9996)), "\u{20b9}10");
        assert_eq!(format_rupee(Some(-0.0001)), "\u{20b9}0");
    }

    #[test]
    fn rupee_large_amounts_stay_exact() {
        assert_eq!(
            format_rupee(Some(1e20)),
            "\u{20b9}10,00,00,00,00,00,00,00,00,000"
        );
        assert_eq!(
            format_rupee(Some(12_345_678_901_234.5)),
            "\u{20b9}1,23,45,67,89,01,234.5"
        );
        assert_eq!(format_rupee(Some(1e39)), "-");
    }

    #[test]
    fn rupee_placeholder_for_missing() {
        assert_eq!(format_rupee(None), "-");
        assert_eq!(format_rupee(Some(f64::NAN)), "-");
    }

    #[test]
    fn empty_recommendations_message() {
        assert_eq!(format_recommendations(Some(&[])), "No recommendations found.");
        assert_eq!(format_recommendations(None), "No recommendations found.");
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let recs = vec![
            Recommendation {
                crop_name: Some("Wheat".into()),
                reasoning: Some("Cool winters".into()),
                best_seeds: Some(vec!["HD-2967".into(), "PBW-343".into()]),
                required_tools: None,
                estimated_cost_per_year: Some(CostEstimate {
                    total_cost: Some(120000.0),
                    breakdown: Some(CostBreakdown {
                        seeds: Some(8000.0),
                        labor: None,
                        ..Default::default()
                    }),
                }),
            },
            Recommendation {
                crop_name: Some("Gram".into()),
                ..Default::default()
            },
        ];

        let text = format_recommendations(Some(&recs));
        assert!(text.contains("1. Wheat"));
        assert!(text.contains("2. Gram"));
        assert!(text.contains("Best Seeds: HD-2967, PBW-343"));
        assert!(text.contains("Required Tools: -"));
        assert!(text.contains("Total: \u{20b9}1,20,000"));
        assert!(text.contains("Seeds: \u{20b9}8,000"));
        assert!(text.contains("Labor: -"));

        let gram = &text[text.find("2. Gram").unwrap()..];
        assert!(gram.contains("Best Seeds: -"));
        assert!(gram.contains("Total: -"));
    }

    #[test]
    fn price_lines() {
        let text = format_price(
            "wheat",
            &PriceRecord {
                min: 2125.0,
                modal: 2275.0,
                max: 2400.0,
            },
        );
        assert!(text.contains("Minimum Price: \u{20b9}2,125"));
        assert!(text.contains("Modal Price: \u{20b9}2,275"));
        assert!(text.contains("Maximum Price: \u{20b9}2,400"));
    }

    #[test]
    fn weather_summary_precision() {
        let series = WeatherSeries {
            date: vec!["Mon, 19 Oct 2026 13:00:00 IST".into()],
            temperature_2m: vec![Some(29.94)],
            rain: vec![Some(0.0)],
            wind_speed_10m: vec![Some(3.5)],
            soil_moisture_0_to_1cm: vec![Some(0.28712)],
            ..Default::default()
        };

        let text = format_weather_summary("", &series, 0);
        assert!(text.contains("Location: Failed to get place name"));
        assert!(text.contains("Time: 19/10/2026, 13:00:00 IST"));
        assert!(text.contains("Temperature: 29.9\u{00b0}C"));
        assert!(text.contains("Rain: 0 mm"));
        assert!(text.contains("Wind: 3.5 m/s"));
        assert!(text.contains("Soil Moisture: 0.287 m"));
    }

    #[test]
    fn heading_mentions_region_when_known() {
        assert_eq!(format_weather_heading(""), "Current Weather");
        assert_eq!(
            format_weather_heading("Pune, Maharashtra"),
            "Current Weather in Pune, Maharashtra"
        );
    }
}
