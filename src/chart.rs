//! Weather chart: a Chart.js line-chart configuration built from a
//! [`WeatherSeries`], and the host that owns mounted chart instances.

use chrono::Timelike;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::models::WeatherSeries;
use crate::weather::parse_timestamp;

const AXIS_TEXT: &str = "#f1f1f1";
const GRID: &str = "#333";

struct SeriesStyle {
    label: &'static str,
    axis: &'static str,
    position: &'static str,
    color: &'static str,
    fill: &'static str,
}

const TEMPERATURE: SeriesStyle = SeriesStyle {
    label: "Temperature (\u{00b0}C)",
    axis: "y",
    position: "left",
    color: "#7ed957",
    fill: "rgba(126,217,87,0.1)",
};

const RAIN: SeriesStyle = SeriesStyle {
    label: "Rain (mm)",
    axis: "y1",
    position: "right",
    color: "#57a7ed",
    fill: "rgba(87,167,237,0.1)",
};

const SOIL_MOISTURE: SeriesStyle = SeriesStyle {
    label: "Soil Moisture",
    axis: "y2",
    position: "right",
    color: "#edc957",
    fill: "rgba(237,201,87,0.1)",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub background_color: String,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: String,
    pub tension: f64,
}

impl Dataset {
    fn styled(style: &SeriesStyle, data: &[Option<f64>]) -> Self {
        Self {
            label: style.label.to_string(),
            data: data.to_vec(),
            border_color: style.color.to_string(),
            background_color: style.fill.to_string(),
            y_axis_id: style.axis.to_string(),
            tension: 0.3,
        }
    }
}

/// `"{hour}:00"` from the timestamp's local hour, `"-"` when unparseable.
pub fn hour_label(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(t) => format!("{}:00", t.hour()),
        None => "-".to_string(),
    }
}

fn axis(style: &SeriesStyle, primary: bool) -> Value {
    let grid = if primary {
        json!({ "color": GRID })
    } else {
        json!({ "drawOnChartArea": false })
    };
    json!({
        "type": "linear",
        "display": true,
        "position": style.position,
        "title": { "display": true, "text": style.label, "color": style.color },
        "ticks": { "color": style.color },
        "grid": grid,
    })
}

impl ChartSpec {
    /// Three independently scaled series over an hourly axis.
    pub fn from_series(series: &WeatherSeries) -> Self {
        let labels = series.date.iter().map(|d| hour_label(d)).collect();
        let datasets = vec![
            Dataset::styled(&TEMPERATURE, &series.temperature_2m),
            Dataset::styled(&RAIN, &series.rain),
            Dataset::styled(&SOIL_MOISTURE, &series.soil_moisture_0_to_1cm),
        ];

        let options = json!({
            "responsive": true,
            "interaction": { "mode": "index", "intersect": false },
            "stacked": false,
            "plugins": {
                "legend": { "labels": { "color": AXIS_TEXT } },
                "title": { "display": false }
            },
            "scales": {
                "x": { "ticks": { "color": AXIS_TEXT }, "grid": { "color": GRID } },
                (TEMPERATURE.axis): axis(&TEMPERATURE, true),
                (RAIN.axis): axis(&RAIN, false),
                (SOIL_MOISTURE.axis): axis(&SOIL_MOISTURE, false),
            }
        });

        Self {
            kind: "line",
            data: ChartData { labels, datasets },
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub id: u64,
    pub spec: ChartSpec,
}

/// Owns at most one live chart per mount point.
#[derive(Debug)]
pub struct ChartHost {
    available: bool,
    next_id: u64,
    mounted: HashMap<String, ChartInstance>,
    destroyed: u64,
}

impl ChartHost {
    /// `available` is the charting capability, decided once per session.
    pub fn new(available: bool) -> Self {
        Self {
            available,
            next_id: 1,
            mounted: HashMap::new(),
            destroyed: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Replaces whatever is mounted at `mount` with a new instance.
    pub fn mount(&mut self, mount: &str, spec: ChartSpec) -> Option<&ChartInstance> {
        if !self.available {
            return None;
        }
        self.destroy(mount);

        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!("Mounting chart {} on {}", id, mount);
        self.mounted
            .insert(mount.to_string(), ChartInstance { id, spec });
        self.mounted.get(mount)
    }

    pub fn destroy(&mut self, mount: &str) -> Option<u64> {
        let instance = self.mounted.remove(mount)?;
        self.destroyed += 1;
        tracing::debug!("Destroyed chart {} on {}", instance.id, mount);
        Some(instance.id)
    }

    pub fn instance(&self, mount: &str) -> Option<&ChartInstance> {
        self.mounted.get(mount)
    }

    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> WeatherSeries {
        WeatherSeries {
            date: vec![
                "Mon, 19 Oct 2026 00:00:00 IST".into(),
                "Mon, 19 Oct 2026 13:00:00 IST".into(),
            ],
            temperature_2m: vec![Some(21.4), Some(29.9)],
            rain: vec![Some(0.0), Some(1.2)],
            wind_speed_10m: vec![Some(2.0), Some(3.5)],
            soil_moisture_0_to_1cm: vec![Some(0.301), Some(0.287)],
            ..Default::default()
        }
    }

    #[test]
    fn labels_use_local_hour() {
        let spec = ChartSpec::from_series(&series());
        assert_eq!(spec.data.labels, vec!["0:00", "13:00"]);
        assert_eq!(hour_label("yesterday-ish"), "-");
    }

    #[test]
    fn three_series_on_separate_axes() {
        let spec = ChartSpec::from_series(&series());
        let axes: Vec<&str> = spec
            .data
            .datasets
            .iter()
            .map(|d| d.y_axis_id.as_str())
            .collect();
        assert_eq!(axes, vec!["y", "y1", "y2"]);
        assert_eq!(spec.options["scales"]["y"]["position"], "left");
        assert_eq!(spec.options["scales"]["y1"]["position"], "right");
        assert_eq!(spec.options["scales"]["y2"]["position"], "right");

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["data"]["datasets"][0]["yAxisID"], "y");
        assert_eq!(json["data"]["datasets"][2]["borderColor"], "#edc957");
    }

    #[test]
    fn remount_destroys_previous_instance() {
        let mut host = ChartHost::new(true);
        let spec = ChartSpec::from_series(&series());
        let first = host.mount("weatherChart", spec.clone()).unwrap().id;
        let second = host.mount("weatherChart", spec).unwrap().id;

        assert_ne!(first, second);
        assert_eq!(host.destroyed_count(), 1);
        assert_eq!(host.instance("weatherChart").unwrap().id, second);
    }

    #[test]
    fn unavailable_host_mounts_nothing() {
        let mut host = ChartHost::new(false);
        assert!(host.mount("weatherChart", ChartSpec::from_series(&series())).is_none());
        assert!(host.instance("weatherChart").is_none());
        assert_eq!(host.destroy("weatherChart"), None);
    }
}
