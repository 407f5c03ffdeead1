//! Core library for the `sunplan` CLI.
//!
//! This crate defines:
//! - The UV exposure planner (skin type + forecast -> recommended windows)
//! - Profile parsing, advice helpers and the exposure countdown timer
//! - Configuration handling and an abstraction over forecast providers
//!
//! It is used by `sunplan-cli`, but can also be reused by other binaries or services.

pub mod activity;
pub mod advice;
pub mod config;
pub mod error;
pub mod model;
pub mod planner;
pub mod profile;
pub mod provider;
pub mod timer;

pub use activity::{ActivityPicker, FirstPicker, SeededPicker};
pub use advice::{UvDescription, is_good_conditions, uv_description, vitamin_d_nudge};
pub use config::{Config, LocationConfig, ProfileConfig, ProviderConfig};
pub use error::ProfileError;
pub use model::{
    DailyPlan, DayPart, ExposureWindow, Forecast, ForecastDay, ForecastRequest, HourlyForecast,
    Location, WeeklyPlan,
};
pub use planner::{ExposurePlanner, estimate_daily_vitamin_d, minutes_for_uv, recommended_minutes};
pub use profile::{ClothingCoverage, Profile, SkinType};
pub use provider::{ForecastProvider, ProviderId};
pub use timer::{Clock, ExposureTimer, SystemClock, TimerSnapshot, TimerState, TimerStatus};
