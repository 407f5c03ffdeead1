use crate::{
    Config, Forecast, ForecastRequest,
    model::{ForecastDay, HourlyForecast},
    provider::{file::FileProvider, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{convert::TryFrom, fmt::Debug};
use tracing::warn;

pub mod file;
pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    File,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::File => "file",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::File]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            "file" => Ok(ProviderId::File),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openmeteo, file."
            )),
        }
    }
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, request: &ForecastRequest) -> anyhow::Result<Forecast>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let boxed: Box<dyn ForecastProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::from_config(config)?),
        ProviderId::File => {
            let path = config.forecast_file().ok_or_else(|| {
                anyhow::anyhow!(
                    "No forecast file configured for provider '{id}'.\n\
                     Hint: set [providers.file] path in the config or pass --forecast-file."
                )
            })?;
            Box::new(FileProvider::new(path.to_path_buf()))
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Split a flat list of hours into calendar days, keeping forecast order.
///
/// Hours whose timestamp cannot be read stay with the day they appear in, so
/// the planner sees (and ignores) them rather than losing them silently here.
pub(crate) fn group_by_local_date(hours: Vec<HourlyForecast>) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = Vec::new();

    for hour in hours {
        let date: Option<NaiveDate> = hour.local_time().map(|t| t.date());
        let joins_last = days
            .last()
            .is_some_and(|day| date.is_none() || day.date == date);

        if joins_last {
            if let Some(day) = days.last_mut() {
                day.hours.push(hour);
            }
            continue;
        }

        if date.is_none() {
            warn!(time = %hour.time, "Forecast hour without a readable date");
        }
        days.push(ForecastDay {
            date,
            hours: vec![hour],
        });
    }

    days
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn file_provider_errors_when_missing_path() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::File, &cfg).unwrap_err();
        assert!(err.to_string().contains("No forecast file configured"));
    }

    #[test]
    fn default_provider_is_openmeteo() {
        let cfg = Config::default();
        let provider = default_provider_from_config(&cfg);
        assert!(provider.is_ok());
    }

    #[test]
    fn default_provider_from_config_uses_file_when_set() {
        let mut cfg = Config::default();
        cfg.set_forecast_file("/tmp/forecast.json".into());
        cfg.set_default_provider(ProviderId::File);

        let provider = default_provider_from_config(&cfg).expect("file provider");
        assert!(format!("{provider:?}").contains("forecast.json"));
    }

    #[test]
    fn groups_hours_by_date() {
        let hours = vec![
            HourlyForecast::new("2026-10-18T07:00", 1.0, ""),
            HourlyForecast::new("2026-10-18T17:00", 1.0, ""),
            HourlyForecast::new("garbled", 1.0, ""),
            HourlyForecast::new("2026-10-19T07:00", 1.0, ""),
        ];
        let days = group_by_local_date(hours);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].hours.len(), 3);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn truncate_long_bodies() {
        let body = "x".repeat(300);
        assert_eq!(truncate_body(&body).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
