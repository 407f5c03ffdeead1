use serde::Serialize;

/// Human-readable summary of a UV index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UvDescription {
    pub level: &'static str,
    pub advice: &'static str,
}

pub fn uv_description(uv: f64) -> UvDescription {
    let (level, advice) = if uv < 3.0 {
        (
            "Low",
            "Minimal protection needed. Longer exposure is fine for most skin types.",
        )
    } else if uv < 6.0 {
        (
            "Moderate",
            "Good for vitamin D. Seek shade around midday and wear sunscreen for longer stays.",
        )
    } else if uv < 8.0 {
        (
            "High",
            "Keep sessions short. Sunscreen SPF 30+, hat and sunglasses recommended.",
        )
    } else if uv < 11.0 {
        (
            "Very High",
            "Limit time outdoors. Sunscreen SPF 50+, protective clothing and shade.",
        )
    } else {
        (
            "Extreme",
            "Avoid sun exposure. Stay indoors or in full shade where possible.",
        )
    };

    UvDescription { level, advice }
}

/// UV between 3 and 7 is enough for vitamin D without being harsh.
pub fn is_good_conditions(uv: f64) -> bool {
    (3.0..=7.0).contains(&uv)
}

/// Dietary nudge for a questionnaire vitamin D status.
pub fn vitamin_d_nudge(status: &str) -> &'static str {
    let status = status.trim();
    if status.is_empty() {
        ""
    } else if status.eq_ignore_ascii_case("inadequate") {
        "This week: add oily fish, eggs, or fortified milk 3-4 times for a vitamin D boost."
    } else {
        "Your vitamin D levels look good! Keep up balanced meals with vitamin D-rich foods."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_levels() {
        let levels: Vec<_> = [0.0, 2.9, 3.0, 5.9, 6.0, 7.9, 8.0, 10.9, 11.0, 14.0]
            .into_iter()
            .map(|uv| uv_description(uv).level)
            .collect();
        assert_eq!(
            levels,
            vec![
                "Low", "Low", "Moderate", "Moderate", "High", "High", "Very High", "Very High",
                "Extreme", "Extreme"
            ]
        );
    }

    #[test]
    fn good_conditions_window() {
        assert!(!is_good_conditions(2.9));
        assert!(is_good_conditions(3.0));
        assert!(is_good_conditions(7.0));
        assert!(!is_good_conditions(7.5));
    }

    #[test]
    fn nudge_by_status() {
        assert!(vitamin_d_nudge("Inadequate").contains("oily fish"));
        assert!(vitamin_d_nudge("adequate").contains("look good"));
        assert_eq!(vitamin_d_nudge(""), "");
    }
}
