use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

use crate::{
    model::{Forecast, ForecastDay, ForecastRequest, HourlyForecast},
    provider::{ProviderId, group_by_local_date},
};

use super::ForecastProvider;

/// Serves a forecast saved as JSON, for offline use and reproducible runs.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Shapes a forecast file may take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ForecastDocument {
    Full(FileForecast),
    Days(Vec<ForecastDay>),
    Hours(Vec<HourlyForecast>),
}

#[derive(Debug, Deserialize)]
struct FileForecast {
    #[serde(default)]
    location_name: Option<String>,
    days: Vec<ForecastDay>,
}

impl ForecastDocument {
    fn into_parts(self) -> (Option<String>, Vec<ForecastDay>) {
        match self {
            ForecastDocument::Full(f) => (f.location_name, f.days),
            ForecastDocument::Days(days) => (None, days),
            ForecastDocument::Hours(hours) => (None, group_by_local_date(hours)),
        }
    }
}

pub fn parse_forecast_document(contents: &str) -> Result<(Option<String>, Vec<ForecastDay>)> {
    let doc: ForecastDocument = serde_json::from_str(contents)
        .context("Forecast JSON must be an object with `days`, a list of days, or a list of hours")?;
    Ok(doc.into_parts())
}

#[async_trait]
impl ForecastProvider for FileProvider {
    async fn forecast(&self, request: &ForecastRequest) -> Result<Forecast> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read forecast file: {}", self.path.display()))?;

        let (location_name, mut days) = parse_forecast_document(&contents)
            .with_context(|| format!("Failed to parse forecast file: {}", self.path.display()))?;

        days.truncate(usize::from(request.days.max(1)));

        info!(days = days.len(), path = %self.path.display(), "Loaded forecast file");

        Ok(Forecast {
            provider: ProviderId::File.to_string(),
            location_name: location_name.unwrap_or_else(|| request.location.display_name()),
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExposurePlanner, FirstPicker, Profile};

    #[test]
    fn accepts_full_document() {
        let (name, days) = parse_forecast_document(
            r#"{"location_name":"Hobart","days":[{"date":"2026-10-18","hours":[{"time":"2026-10-18T07:00","uv":2.0}]}]}"#,
        )
        .expect("valid document");
        assert_eq!(name.as_deref(), Some("Hobart"));
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].hours[0].uv, Some(2.0));
    }

    #[test]
    fn accepts_list_of_days() {
        let (name, days) = parse_forecast_document(
            r#"[{"hours":[]},{"hours":[{"time":"2026-10-19T17:00","uv":1.0,"condition":"sunny"}]}]"#,
        )
        .expect("valid document");
        assert_eq!(name, None);
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn accepts_flat_hours() {
        let (_, days) = parse_forecast_document(
            r#"[{"time":"2026-10-18T07:00","uv":2.0},{"time":"2026-10-19T07:00","uv":3.0}]"#,
        )
        .expect("valid document");
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn unreadable_uv_only_drops_that_hour() {
        let (_, days) = parse_forecast_document(
            r#"[
                {"time":"2026-10-18T07:00","uv":2.5,"condition":"Sunny","temp_c":18},
                {"time":"2026-10-18T08:00","uv":"n/a","condition":"Sunny","temp_c":19},
                {"time":"2026-10-18T09:00","uv":"3.0","condition":"Sunny","temp_c":"warm"}
            ]"#,
        )
        .expect("document with one bad hour still parses");

        assert_eq!(days.len(), 1);
        let hours = &days[0].hours;
        assert_eq!(hours.len(), 3);
        assert_eq!(hours[0].viable_uv(), Some(2.5));
        assert_eq!(hours[1].viable_uv(), None);
        assert_eq!(hours[2].viable_uv(), Some(3.0));
        assert_eq!(hours[2].temp_c, None);
    }

    #[test]
    fn bad_hour_is_skipped_by_the_planner() {
        let (_, days) = parse_forecast_document(
            r#"{"days":[{"date":"2026-10-18","hours":[
                {"time":"2026-10-18T07:00","uv":2.5,"condition":"Sunny","temp_c":18},
                {"time":"2026-10-18T08:00","uv":"n/a","condition":"Sunny","temp_c":18}
            ]}]}"#,
        )
        .expect("valid document");

        let mut planner = ExposurePlanner::new(FirstPicker);
        let plan = planner.build_weekly_plan(&Profile::default(), &days);
        let morning = plan.days[0].morning.as_ref().expect("07:00 stays plannable");
        assert_eq!(morning.uv, 2.5);
        assert_eq!(
            morning.time.map(|t| t.format("%H:%M").to_string()).as_deref(),
            Some("07:00")
        );
    }

    #[test]
    fn non_string_time_is_kept_but_unplannable() {
        let (_, days) = parse_forecast_document(
            r#"[{"time":"2026-10-18T07:00","uv":2.0},{"time":42,"uv":2.0}]"#,
        )
        .expect("valid document");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].hours[1].local_time(), None);
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(parse_forecast_document(r#"{"hourly":{}}"#).is_err());
    }
}
