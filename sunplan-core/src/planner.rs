//! UV exposure planning.
//!
//! Turns hourly forecasts into at most one recommended exposure window per
//! day part (morning, afternoon), sized for the user's skin type and
//! clothing. Everything here is pure apart from the activity picker.

use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use crate::{
    activity::{ActivityPicker, ActivityTier, SeededPicker, choose_activity},
    model::{DailyPlan, DayPart, ExposureWindow, ForecastDay, HourlyForecast, WeeklyPlan},
    profile::{Profile, SkinType},
};

pub const MIN_WINDOW_MINUTES: u32 = 5;
pub const MAX_WINDOW_MINUTES: u32 = 60;
pub const FALLBACK_MINUTES: u32 = 15;
/// Reported when a forecast hour carries no temperature.
pub const DEFAULT_TEMP_C: f64 = 20.0;
pub const FALLBACK_WARNING: &str =
    "No safe outdoor window today. Try an indoor activity and vitamin D-rich foods.";

const WARNING_VERY_HIGH: &str = "Very high UV - sunscreen SPF 50+, hat, and seek shade";
const WARNING_HIGH: &str = "High UV - sunscreen SPF 30+, hat recommended";
const WARNING_MODERATE: &str = "Moderate UV - apply sunscreen if staying out longer";
const WARNING_LONG_STAY: &str = "Apply sunscreen if staying longer than the recommended time";

/// Recommended minutes of exposure for a skin type at a given UV index.
///
/// Zero means "don't go out for vitamin D": either there is no UV to speak of
/// or it is extreme.
pub fn minutes_for_uv(skin_type: SkinType, uv: f64) -> u32 {
    let base = f64::from(skin_type.base_minutes());
    let scaled = |factor: f64| (base * factor).round() as u32;

    if uv <= 0.0 {
        0
    } else if uv <= 2.0 {
        scaled(1.3)
    } else if uv <= 3.0 {
        skin_type.base_minutes()
    } else if uv <= 5.0 {
        scaled(0.9)
    } else if uv <= 7.0 {
        scaled(0.6).max(8)
    } else if uv <= 9.0 {
        scaled(0.4).max(5)
    } else {
        0
    }
}

/// Session length for a profile: UV-based minutes scaled by clothing, clamped
/// to 5..=60.
pub fn recommended_minutes(profile: &Profile, uv: f64) -> u32 {
    let raw = minutes_for_uv(profile.skin_type, uv);
    ((f64::from(raw) * profile.clothing.multiplier()).round() as u32)
        .clamp(MIN_WINDOW_MINUTES, MAX_WINDOW_MINUTES)
}

/// Rough vitamin D yield (IU) of one exposure session.
///
/// Below UV 3 synthesis is negligible, so the estimate is zero.
pub fn estimate_daily_vitamin_d(skin_type: SkinType, minutes: i64, uv: f64) -> u32 {
    if !uv.is_finite() || uv < 3.0 || minutes <= 0 {
        return 0;
    }
    let uv_factor = (uv / 3.0).min(2.0);
    let iu = 1000.0 * skin_type.vitamin_d_factor() * uv_factor * (minutes as f64 / 15.0);
    iu.round() as u32
}

fn uv_score(part: DayPart, uv: f64) -> i32 {
    match part {
        DayPart::Morning => {
            if (2.0..=3.0).contains(&uv) {
                100
            } else if (1.0..2.0).contains(&uv) {
                80
            } else if uv > 3.0 && uv <= 5.0 {
                60
            } else {
                20
            }
        }
        DayPart::Afternoon => {
            if uv <= 2.0 {
                100
            } else if uv <= 3.0 {
                80
            } else if uv <= 5.0 {
                50
            } else {
                20
            }
        }
        DayPart::Fallback => 0,
    }
}

fn hour_score(part: DayPart, hour: u32) -> i32 {
    match (part, hour) {
        (DayPart::Morning, h) if h <= 8 => 20,
        (DayPart::Morning, 9) => 10,
        (DayPart::Afternoon, h) if h >= 17 => 20,
        (DayPart::Afternoon, 16) => 10,
        _ => 0,
    }
}

fn condition_score(condition: &str) -> i32 {
    let c = condition.to_lowercase();
    let mut score = 0;
    if c.contains("clear") || c.contains("sunny") {
        score += 10;
    }
    if c.contains("cloud") {
        score += 5;
    }
    if c.contains("rain") || c.contains("storm") {
        score -= 50;
    }
    score
}

fn temperature_score(temp_c: Option<f64>) -> i32 {
    match temp_c {
        Some(t) if (15.0..=25.0).contains(&t) => 15,
        Some(t) if t < 10.0 || t > 30.0 => -10,
        _ => 0,
    }
}

fn score_slot(part: DayPart, hour: u32, uv: f64, forecast: &HourlyForecast) -> i32 {
    uv_score(part, uv)
        + hour_score(part, hour)
        + condition_score(&forecast.condition)
        + temperature_score(forecast.temp_c)
}

fn warning_for(uv: f64, minutes: u32) -> Option<&'static str> {
    if uv >= 8.0 {
        Some(WARNING_VERY_HIGH)
    } else if uv >= 6.0 {
        Some(WARNING_HIGH)
    } else if uv >= 4.0 {
        Some(WARNING_MODERATE)
    } else if uv >= 3.0 && minutes > 20 {
        Some(WARNING_LONG_STAY)
    } else {
        None
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

struct Candidate<'a> {
    index: usize,
    time: NaiveDateTime,
    uv: f64,
    score: i32,
    forecast: &'a HourlyForecast,
}

/// Builds exposure plans, drawing activity suggestions from `P`.
#[derive(Debug, Clone)]
pub struct ExposurePlanner<P = SeededPicker> {
    picker: P,
}

impl Default for ExposurePlanner<SeededPicker> {
    fn default() -> Self {
        Self::new(SeededPicker::from_entropy())
    }
}

impl ExposurePlanner<SeededPicker> {
    /// Planner whose activity choices repeat for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededPicker::new(seed))
    }
}

impl<P: ActivityPicker> ExposurePlanner<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    /// Plan a single day from its hourly forecast.
    ///
    /// Returns a fallback indoor window when neither the morning nor the
    /// afternoon has a viable hour.
    pub fn build_daily_plan(&mut self, profile: &Profile, hours: &[HourlyForecast]) -> DailyPlan {
        let dropped = hours.iter().filter(|h| h.local_time().is_none()).count();
        if dropped > 0 {
            warn!(dropped, "Ignoring forecast hours with unparsable timestamps");
        }

        let morning = self.best_window(profile, DayPart::Morning, hours);
        let afternoon = self.best_window(profile, DayPart::Afternoon, hours);

        let fallback = if morning.is_none() && afternoon.is_none() {
            Some(self.fallback_window(hours))
        } else {
            None
        };

        DailyPlan {
            date: hours
                .iter()
                .find_map(HourlyForecast::local_time)
                .map(|t| t.date()),
            morning,
            afternoon,
            fallback,
        }
    }

    /// Plan every forecast day in order.
    pub fn build_weekly_plan(&mut self, profile: &Profile, days: &[ForecastDay]) -> WeeklyPlan {
        let days: Vec<DailyPlan> = days
            .iter()
            .map(|day| {
                let mut plan = self.build_daily_plan(profile, &day.hours);
                if day.date.is_some() {
                    plan.date = day.date;
                }
                plan
            })
            .collect();

        info!(
            days = days.len(),
            outdoor_days = days.iter().filter(|d| d.has_outdoor_window()).count(),
            skin_type = %profile.skin_type,
            clothing = %profile.clothing,
            "Built weekly exposure plan"
        );

        WeeklyPlan { days }
    }

    fn best_window(
        &mut self,
        profile: &Profile,
        part: DayPart,
        hours: &[HourlyForecast],
    ) -> Option<ExposureWindow> {
        let best = hours
            .iter()
            .enumerate()
            .filter_map(|(index, forecast)| {
                let time = forecast.local_time()?;
                let hour = time.hour();
                if !part.contains_hour(hour) {
                    return None;
                }
                let uv = forecast.viable_uv()?;
                let score = score_slot(part, hour, uv, forecast);
                debug!(%part, %time, uv, score, "Scored exposure slot");
                Some(Candidate {
                    index,
                    time,
                    uv,
                    score,
                    forecast,
                })
            })
            // highest score; equal scores go to the earliest slot
            .max_by(|a, b| {
                a.score
                    .cmp(&b.score)
                    .then_with(|| b.time.cmp(&a.time))
                    .then_with(|| b.index.cmp(&a.index))
            })?;

        let minutes = recommended_minutes(profile, best.uv);

        let activity = choose_activity(&mut self.picker, best.uv, &best.forecast.condition);
        let indoor = activity.indoor();

        Some(ExposureWindow {
            time: Some(best.time),
            uv: round_tenth(best.uv),
            condition: best.forecast.condition.clone(),
            temp_c: best.forecast.temp_c.unwrap_or(DEFAULT_TEMP_C),
            minutes,
            activity: activity.label,
            indoor,
            warning: warning_for(best.uv, minutes).map(str::to_string),
            day_part: part,
        })
    }

    fn fallback_window(&mut self, hours: &[HourlyForecast]) -> ExposureWindow {
        let first = hours.first();
        ExposureWindow {
            time: first.and_then(HourlyForecast::local_time),
            uv: 0.0,
            condition: first.map(|h| h.condition.clone()).unwrap_or_default(),
            temp_c: first.and_then(|h| h.temp_c).unwrap_or(DEFAULT_TEMP_C),
            minutes: FALLBACK_MINUTES,
            activity: self.picker.pick(ActivityTier::Indoor.pool()).to_string(),
            indoor: true,
            warning: Some(FALLBACK_WARNING.to_string()),
            day_part: DayPart::Fallback,
        }
    }
}
