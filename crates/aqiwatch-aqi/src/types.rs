use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// `data_source` value the backend uses for measured (non-demo) data.
pub const REAL_API_SOURCE: &str = "real_api";

/// Coordinates echoed back by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AqiLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub coordinates: Coordinates,
}

/// Current AQI reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentAqi {
    pub value: f64,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Health guidance for the current reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthImpact {
    #[serde(deserialize_with = "null_as_default")]
    pub general_population: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sensitive_groups: String,
    #[serde(deserialize_with = "null_as_default")]
    pub outdoor_activities: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exercise: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ventilation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

/// A single pollutant concentration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantData {
    #[serde(deserialize_with = "null_as_default")]
    pub value: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DominantPollutant {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: f64,
    /// Share of the overall AQI, in percent
    #[serde(deserialize_with = "null_as_default")]
    pub contribution: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantBreakdown {
    #[serde(rename = "PM2.5")]
    pub pm2_5: Option<PollutantData>,
    #[serde(rename = "PM10")]
    pub pm10: Option<PollutantData>,
    #[serde(rename = "O3")]
    pub o3: Option<PollutantData>,
    pub dominant_pollutant: Option<DominantPollutant>,
}

impl PollutantBreakdown {
    /// Pollutants present in the payload, labelled, in display order.
    pub fn entries(&self) -> Vec<(&'static str, &PollutantData)> {
        [("PM2.5", &self.pm2_5), ("PM10", &self.pm10), ("O3", &self.o3)]
            .into_iter()
            .filter_map(|(label, data)| data.as_ref().map(|d| (label, d)))
            .collect()
    }
}

/// Trend analysis over the historical and predicted windows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub overall_trend: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub trend_strength: String,
    #[serde(deserialize_with = "null_as_default")]
    pub historical_change: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub predicted_change: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub volatility: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityAlert {
    #[serde(deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
}

/// One day of the historical or predicted series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AqiDataPoint {
    /// `YYYY-MM-DD`
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub aqi: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
}

/// Complete overview payload for one location.
///
/// A fresh fetch replaces the whole record; nothing is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiOverview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: AqiLocation,
    pub current_aqi: CurrentAqi,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_impact: HealthImpact,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pollutant_breakdown: PollutantBreakdown,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trend_analysis: TrendAnalysis,
    #[serde(default, deserialize_with = "null_as_default")]
    pub air_quality_alerts: Vec<AirQualityAlert>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seasonal_recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub historical_data: Vec<AqiDataPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub predicted_data: Vec<AqiDataPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aqi_scale_reference: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_source: String,
}

impl AqiOverview {
    /// True unless the backend reports measured data.
    pub fn is_demo(&self) -> bool {
        self.data_source != REAL_API_SOURCE
    }
}

/// Backend health probe response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub predictor_loaded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
