//! File provider and config persistence on a real filesystem.

use std::fs;

use sunplan_core::{
    Config, ForecastRequest, Location, ProviderId, SkinType, ClothingCoverage,
    provider::default_provider_from_config,
};

#[tokio::test]
async fn test_file_provider_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let forecast_path = dir.path().join("forecast.json");
    fs::write(
        &forecast_path,
        serde_json::json!({
            "location_name": "Perth",
            "days": [
                { "date": "2026-10-18", "hours": [ { "time": "2026-10-18T07:00", "uv": 2.5, "condition": "clear" } ] },
                { "date": "2026-10-19", "hours": [] },
                { "date": "2026-10-20", "hours": [] }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut cfg = Config::default();
    cfg.set_forecast_file(forecast_path);
    cfg.set_default_provider(ProviderId::File);

    let provider = default_provider_from_config(&cfg).unwrap();
    let forecast = provider
        .forecast(&ForecastRequest {
            location: Location::default(),
            days: 2,
        })
        .await
        .unwrap();

    assert_eq!(forecast.provider, "file");
    assert_eq!(forecast.location_name, "Perth");
    assert_eq!(forecast.days.len(), 2);
}

#[tokio::test]
async fn test_file_provider_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = Config::default();
    cfg.set_forecast_file(dir.path().join("absent.json"));
    cfg.set_default_provider(ProviderId::File);

    let provider = default_provider_from_config(&cfg).unwrap();
    let err = provider
        .forecast(&ForecastRequest {
            location: Location::default(),
            days: 7,
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to read forecast file"));
}

#[test]
fn test_config_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.set_profile(SkinType::II, ClothingCoverage::Minimal);
    cfg.location.city = Some("Darwin".to_string());
    cfg.activity_seed = Some(9);
    cfg.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.planner_profile().skin_type, SkinType::II);
    assert_eq!(loaded.planner_profile().clothing, ClothingCoverage::Minimal);
    assert_eq!(loaded.location.city.as_deref(), Some("Darwin"));
    assert_eq!(loaded.activity_seed, Some(9));
}

#[test]
fn test_config_load_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
    assert_eq!(cfg.forecast_days(), 7);
    assert!(cfg.default_provider.is_none());
}
