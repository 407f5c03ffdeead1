use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::Location,
    profile::{ClothingCoverage, Profile, SkinType},
    provider::ProviderId,
};

pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Per-provider overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Forecast endpoint, e.g. a self-hosted Open-Meteo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding_url: Option<String>,

    /// Forecast JSON for the `file` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Questionnaire answers, stored as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub skin_type: Option<String>,
    pub clothing: Option<String>,
    pub vitamin_d_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
                name: self.city.clone(),
            }),
            _ => None,
        }
    }
}

fn default_forecast_days() -> u8 {
    DEFAULT_FORECAST_DAYS
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Optional default provider id, e.g. "openmeteo" or "file".
    pub default_provider: Option<String>,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Fixed seed for activity suggestions; random when absent.
    pub activity_seed: Option<u64>,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub location: LocationConfig,

    /// Example TOML:
    /// [providers.file]
    /// path = "/home/me/forecast.json"
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            forecast_days: DEFAULT_FORECAST_DAYS,
            activity_seed: None,
            profile: ProfileConfig::default(),
            location: LocationConfig::default(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    /// Open-Meteo needs no credentials, so it is used when nothing is set.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s).map_err(|e| {
                anyhow!("{e}\nHint: run `sunplan configure` to pick a provider again.")
            }),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn forecast_file(&self) -> Option<&Path> {
        self.provider_config(ProviderId::File)
            .and_then(|cfg| cfg.path.as_deref())
    }

    pub fn set_forecast_file(&mut self, path: PathBuf) {
        self.providers
            .entry(ProviderId::File.as_str().to_string())
            .or_default()
            .path = Some(path);
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.clamp(1, MAX_FORECAST_DAYS)
    }

    /// Planner profile; missing or odd answers fall back to type III / normal.
    pub fn planner_profile(&self) -> Profile {
        Profile::from_answers(
            self.profile.skin_type.as_deref(),
            self.profile.clothing.as_deref(),
        )
    }

    pub fn set_profile(&mut self, skin_type: SkinType, clothing: ClothingCoverage) {
        self.profile.skin_type = Some(skin_type.to_string());
        self.profile.clothing = Some(clothing.to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "sunplan", "sunplan-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_id_falls_back_to_openmeteo() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().ok(), Some(ProviderId::OpenMeteo));
    }

    #[test]
    fn default_provider_id_rejects_unknown() {
        let cfg = Config {
            default_provider: Some("accuweather".into()),
            ..Config::default()
        };
        let err = cfg.default_provider_id().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown provider"));
        assert!(msg.contains("Hint: run `sunplan configure`"));
    }

    #[test]
    fn set_default_provider_overrides_default() {
        let mut cfg = Config::default();
        cfg.set_default_provider(ProviderId::File);

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::File);
    }

    #[test]
    fn forecast_file_is_stored_under_file_provider() {
        let mut cfg = Config::default();
        assert!(cfg.forecast_file().is_none());

        cfg.set_forecast_file("/tmp/f.json".into());
        assert_eq!(cfg.forecast_file(), Some(Path::new("/tmp/f.json")));
        assert!(cfg.provider_config(ProviderId::File).is_some());
    }

    #[test]
    fn profile_defaults_and_ranges() {
        let mut cfg = Config::default();
        assert_eq!(cfg.planner_profile(), Profile::default());

        cfg.profile.skin_type = Some("V-VI".into());
        cfg.profile.clothing = Some("full-coverage".into());
        let profile = cfg.planner_profile();
        assert_eq!(profile.skin_type, SkinType::VI);
        assert_eq!(profile.clothing, ClothingCoverage::Covered);
    }

    #[test]
    fn forecast_days_clamped() {
        let mut cfg = Config::default();
        assert_eq!(cfg.forecast_days(), 7);
        cfg.forecast_days = 0;
        assert_eq!(cfg.forecast_days(), 1);
        cfg.forecast_days = 40;
        assert_eq!(cfg.forecast_days(), 16);
    }

    #[test]
    fn parses_minimal_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [location]
            latitude = -33.87
            longitude = 151.21
            city = "Sydney"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.forecast_days, DEFAULT_FORECAST_DAYS);
        let loc = cfg.location.coordinates().expect("coordinates");
        assert_eq!(loc.name.as_deref(), Some("Sydney"));
    }
}
