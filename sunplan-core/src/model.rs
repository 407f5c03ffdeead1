use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Melbourne, the fallback when no location is configured.
pub const DEFAULT_LATITUDE: f64 = -37.8136;
pub const DEFAULT_LONGITUDE: f64 = 144.9631;
pub const DEFAULT_LOCATION_NAME: &str = "Melbourne, Australia";

const LOCAL_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            name: Some(DEFAULT_LOCATION_NAME.to_string()),
        }
    }
}

impl Location {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{:.4}, {:.4}", self.latitude, self.longitude))
    }
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub location: Location,
    pub days: u8,
}

/// One hour of forecast as delivered by a provider.
///
/// `time` is kept as text and interpreted lazily as local wall-clock time, so
/// a malformed entry only disqualifies itself instead of the whole forecast.
/// The same goes for `uv` and `temp_c`: a value that is not a number (or a
/// numeric string) reads as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub uv: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub condition: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temp_c: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

impl HourlyForecast {
    pub fn new(time: impl Into<String>, uv: f64, condition: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            uv: Some(uv),
            condition: condition.into(),
            temp_c: None,
        }
    }

    pub fn with_temp(mut self, temp_c: f64) -> Self {
        self.temp_c = Some(temp_c);
        self
    }

    pub fn local_time(&self) -> Option<NaiveDateTime> {
        let raw = self.time.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        LOCAL_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// UV index when it lies in the plannable range `0 < uv <= 10`.
    pub fn viable_uv(&self) -> Option<f64> {
        self.uv.filter(|uv| uv.is_finite() && *uv > 0.0 && *uv <= 10.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    pub hours: Vec<HourlyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub provider: String,
    pub location_name: String,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Morning,
    Afternoon,
    Fallback,
}

impl DayPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Morning => "morning",
            DayPart::Afternoon => "afternoon",
            DayPart::Fallback => "fallback",
        }
    }

    /// Inclusive local-hour range the day part covers.
    pub fn hours(&self) -> Option<(u32, u32)> {
        match self {
            DayPart::Morning => Some((6, 10)),
            DayPart::Afternoon => Some((15, 19)),
            DayPart::Fallback => None,
        }
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        self.hours()
            .is_some_and(|(start, end)| (start..=end).contains(&hour))
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A recommended exposure slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureWindow {
    pub time: Option<NaiveDateTime>,
    pub uv: f64,
    pub condition: String,
    pub temp_c: f64,
    pub minutes: u32,
    pub activity: String,
    pub indoor: bool,
    pub warning: Option<String>,
    pub day_part: DayPart,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<ExposureWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<ExposureWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ExposureWindow>,
}

impl DailyPlan {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn has_outdoor_window(&self) -> bool {
        self.morning.is_some() || self.afternoon.is_some()
    }

    /// Windows in day order: morning, afternoon, then the fallback.
    pub fn windows(&self) -> impl Iterator<Item = &ExposureWindow> {
        self.morning
            .iter()
            .chain(self.afternoon.iter())
            .chain(self.fallback.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub days: Vec<DailyPlan>,
}

impl WeeklyPlan {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// False when every day fell back to indoor advice (or there are no days).
    pub fn has_outdoor_window(&self) -> bool {
        self.days.iter().any(DailyPlan::has_outdoor_window)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyPlan> {
        self.days.iter()
    }
}
