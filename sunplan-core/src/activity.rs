//! Activity suggestions for exposure windows.
//!
//! Suggestions are grouped into pools by UV tier. Which entry of a pool is
//! used is left to an [`ActivityPicker`], so callers decide between varied
//! output and reproducible output.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LOW_UV: &[&str] = &[
    "Morning walk",
    "Light gardening",
    "Park visit",
    "Gentle cycling",
    "Outdoor reading",
];

const MODERATE_UV: &[&str] = &[
    "Brisk walk",
    "Sunrise yoga",
    "Nature walk",
    "Garden activities",
    "Outdoor stretching",
];

const ELEVATED_UV: &[&str] = &[
    "Afternoon stroll",
    "Outdoor coffee break",
    "Walk in dappled shade",
    "Light sports",
];

const HIGH_UV: &[&str] = &[
    "Short shaded stroll",
    "Quick errand on foot",
    "Brief balcony break",
];

const INDOOR: &[&str] = &[
    "Indoor mobility",
    "Stretching routine",
    "Balance exercises",
    "Home workout",
    "Yoga session",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityTier {
    Low,
    Moderate,
    Elevated,
    High,
    Indoor,
}

impl ActivityTier {
    /// Tier for a slot; bad weather or UV above 7 always moves indoors.
    pub fn for_slot(uv: f64, condition: &str) -> Self {
        let c = condition.to_lowercase();
        if c.contains("rain") || c.contains("storm") || c.contains("thunder") {
            return ActivityTier::Indoor;
        }

        if uv <= 2.0 {
            ActivityTier::Low
        } else if uv <= 3.0 {
            ActivityTier::Moderate
        } else if uv <= 5.0 {
            ActivityTier::Elevated
        } else if uv <= 7.0 {
            ActivityTier::High
        } else {
            ActivityTier::Indoor
        }
    }

    pub fn pool(&self) -> &'static [&'static str] {
        match self {
            ActivityTier::Low => LOW_UV,
            ActivityTier::Moderate => MODERATE_UV,
            ActivityTier::Elevated => ELEVATED_UV,
            ActivityTier::High => HIGH_UV,
            ActivityTier::Indoor => INDOOR,
        }
    }

    pub fn is_indoor(&self) -> bool {
        matches!(self, ActivityTier::Indoor)
    }
}

/// Chooses one entry out of a non-empty activity pool.
pub trait ActivityPicker {
    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str;
}

/// Uniform choice driven by a ChaCha RNG.
#[derive(Debug, Clone)]
pub struct SeededPicker {
    rng: ChaCha8Rng,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl ActivityPicker for SeededPicker {
    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        if pool.is_empty() {
            return "";
        }
        pool[self.rng.gen_range(0..pool.len())]
    }
}

/// Always takes the first entry of each pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl ActivityPicker for FirstPicker {
    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.first().copied().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub label: String,
    pub tier: ActivityTier,
}

impl Activity {
    pub fn indoor(&self) -> bool {
        self.tier.is_indoor()
    }
}

/// Pick an activity for a slot and annotate outdoor ones with the weather.
pub fn choose_activity<P: ActivityPicker + ?Sized>(
    picker: &mut P,
    uv: f64,
    condition: &str,
) -> Activity {
    let tier = ActivityTier::for_slot(uv, condition);
    let base = picker.pick(tier.pool());

    let c = condition.to_lowercase();
    let label = if tier.is_indoor() {
        base.to_string()
    } else if c.contains("wind") {
        format!("{base} (sheltered area)")
    } else if c.contains("cloud") {
        format!("{base} (cloudy)")
    } else {
        base.to_string()
    };

    Activity { label, tier }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_uv() {
        assert_eq!(ActivityTier::for_slot(1.5, "clear"), ActivityTier::Low);
        assert_eq!(ActivityTier::for_slot(2.5, "clear"), ActivityTier::Moderate);
        assert_eq!(ActivityTier::for_slot(4.0, "clear"), ActivityTier::Elevated);
        assert_eq!(ActivityTier::for_slot(7.0, "clear"), ActivityTier::High);
        assert_eq!(ActivityTier::for_slot(7.1, "clear"), ActivityTier::Indoor);
    }

    #[test]
    fn bad_weather_forces_indoor() {
        for condition in ["Slight Rain", "storm", "Thunderstorm with Slight Hail"] {
            assert_eq!(ActivityTier::for_slot(1.0, condition), ActivityTier::Indoor);
        }
    }

    #[test]
    fn seeded_picker_is_reproducible() {
        let mut a = SeededPicker::new(7);
        let mut b = SeededPicker::new(7);
        let picks_a: Vec<_> = (0..10).map(|_| a.pick(MODERATE_UV)).collect();
        let picks_b: Vec<_> = (0..10).map(|_| b.pick(MODERATE_UV)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|p| MODERATE_UV.contains(p)));
    }

    #[test]
    fn weather_suffixes_on_outdoor_labels() {
        let windy = choose_activity(&mut FirstPicker, 1.0, "Windy");
        assert_eq!(windy.label, "Morning walk (sheltered area)");

        let cloudy = choose_activity(&mut FirstPicker, 2.5, "Partly Cloudy");
        assert_eq!(cloudy.label, "Brisk walk (cloudy)");

        let rainy = choose_activity(&mut FirstPicker, 2.5, "Rain, windy");
        assert_eq!(rainy.label, "Indoor mobility");
        assert!(rainy.indoor());
    }
}
