use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ProfileError;

/// Fitzpatrick skin type, I (very fair) through VI (very dark).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkinType {
    I,
    II,
    #[default]
    III,
    IV,
    V,
    VI,
}

impl SkinType {
    pub const fn all() -> &'static [SkinType] {
        &[
            SkinType::I,
            SkinType::II,
            SkinType::III,
            SkinType::IV,
            SkinType::V,
            SkinType::VI,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::I => "I",
            SkinType::II => "II",
            SkinType::III => "III",
            SkinType::IV => "IV",
            SkinType::V => "V",
            SkinType::VI => "VI",
        }
    }

    /// 1-based position on the Fitzpatrick scale.
    pub fn ordinal(&self) -> u8 {
        match self {
            SkinType::I => 1,
            SkinType::II => 2,
            SkinType::III => 3,
            SkinType::IV => 4,
            SkinType::V => 5,
            SkinType::VI => 6,
        }
    }

    /// Clamps out-of-range ordinals into I..VI.
    pub fn from_ordinal(n: i64) -> Self {
        match n.clamp(1, 6) {
            1 => SkinType::I,
            2 => SkinType::II,
            3 => SkinType::III,
            4 => SkinType::IV,
            5 => SkinType::V,
            _ => SkinType::VI,
        }
    }

    /// Safe exposure time at UV 2-3, in minutes.
    pub fn base_minutes(&self) -> u32 {
        match self {
            SkinType::I => 10,
            SkinType::II => 12,
            SkinType::III => 15,
            SkinType::IV => 18,
            SkinType::V => 22,
            SkinType::VI => 25,
        }
    }

    /// Relative vitamin D synthesis efficiency.
    pub fn vitamin_d_factor(&self) -> f64 {
        match self {
            SkinType::I => 1.2,
            SkinType::II => 1.1,
            SkinType::III => 1.0,
            SkinType::IV => 0.8,
            SkinType::V => 0.7,
            SkinType::VI => 0.6,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SkinType::I => "Very fair",
            SkinType::II => "Fair",
            SkinType::III => "Medium",
            SkinType::IV => "Olive",
            SkinType::V => "Dark",
            SkinType::VI => "Very dark",
        }
    }

    /// Parse questionnaire input, falling back to type III for anything unrecognized.
    ///
    /// Ranges such as `"I-II"` resolve to their rounded midpoint; unknown parts of a
    /// range count as III.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.contains('-') {
            let parts: Vec<u8> = trimmed
                .split('-')
                .map(|p| single_ordinal(p).unwrap_or(3))
                .collect();
            return midpoint(&parts);
        }

        single_ordinal(trimmed)
            .map(|n| Self::from_ordinal(n.into()))
            .unwrap_or_default()
    }
}

fn single_ordinal(part: &str) -> Option<u8> {
    match part.trim().to_uppercase().as_str() {
        "I" | "1" => Some(1),
        "II" | "2" => Some(2),
        "III" | "3" => Some(3),
        "IV" | "4" => Some(4),
        "V" | "5" => Some(5),
        "VI" | "6" => Some(6),
        _ => None,
    }
}

fn midpoint(parts: &[u8]) -> SkinType {
    if parts.is_empty() {
        return SkinType::default();
    }
    let sum: u32 = parts.iter().map(|&n| u32::from(n)).sum();
    let avg = f64::from(sum) / parts.len() as f64;
    SkinType::from_ordinal(avg.round() as i64)
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Option<Vec<u8>> = s.trim().split('-').map(single_ordinal).collect();
        match parts {
            Some(parts) if !parts.is_empty() => Ok(midpoint(&parts)),
            _ => Err(ProfileError::UnknownSkinType(s.to_string())),
        }
    }
}

impl From<String> for SkinType {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<SkinType> for String {
    fn from(value: SkinType) -> Self {
        value.as_str().to_string()
    }
}

/// How much skin is exposed while outdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClothingCoverage {
    Minimal,
    #[default]
    Normal,
    Covered,
}

impl ClothingCoverage {
    pub const fn all() -> &'static [ClothingCoverage] {
        &[
            ClothingCoverage::Minimal,
            ClothingCoverage::Normal,
            ClothingCoverage::Covered,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingCoverage::Minimal => "minimal",
            ClothingCoverage::Normal => "normal",
            ClothingCoverage::Covered => "covered",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ClothingCoverage::Minimal => 0.75,
            ClothingCoverage::Normal => 1.0,
            ClothingCoverage::Covered => 1.3,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "minimal" | "arms-legs-exposed" => Some(ClothingCoverage::Minimal),
            "normal" => Some(ClothingCoverage::Normal),
            "covered" | "full-coverage" => Some(ClothingCoverage::Covered),
            _ => None,
        }
    }

    /// First whole token naming a coverage. Hyphens stay inside a token, so
    /// `"arms-legs-exposed"` is one token.
    fn match_text(input: &str) -> Option<Self> {
        input
            .to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .find_map(Self::from_token)
    }

    /// Token match over free text, e.g. questionnaire answers like
    /// `"arms-legs-exposed"`; anything else is `Normal`.
    pub fn parse_lenient(input: &str) -> Self {
        Self::match_text(input).unwrap_or_default()
    }
}

impl fmt::Display for ClothingCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClothingCoverage {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::match_text(s).ok_or_else(|| ProfileError::UnknownClothing(s.to_string()))
    }
}

impl From<String> for ClothingCoverage {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<ClothingCoverage> for String {
    fn from(value: ClothingCoverage) -> Self {
        value.as_str().to_string()
    }
}

/// The user attributes the planner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub skin_type: SkinType,
    #[serde(default)]
    pub clothing: ClothingCoverage,
}

impl Profile {
    pub fn new(skin_type: SkinType, clothing: ClothingCoverage) -> Self {
        Self { skin_type, clothing }
    }

    /// Build from raw questionnaire answers; missing answers use the defaults.
    pub fn from_answers(skin_type: Option<&str>, clothing: Option<&str>) -> Self {
        Self {
            skin_type: skin_type.map(SkinType::parse_lenient).unwrap_or_default(),
            clothing: clothing.map(ClothingCoverage::parse_lenient).unwrap_or_default(),
        }
    }
}
