use sunplan_core::{
    DailyPlan, ExposureWindow, Profile, WeeklyPlan, estimate_daily_vitamin_d, uv_description,
};

pub fn print_weekly_plan(location: &str, profile: &Profile, plan: &WeeklyPlan) {
    println!(
        "Exposure plan for {location} (skin type {}, {} clothing)",
        profile.skin_type, profile.clothing
    );

    if plan.is_empty() {
        println!("No forecast data available. Try again later.");
        return;
    }

    for day in plan.iter() {
        println!();
        print_day(profile, day);
    }

    if !plan.has_outdoor_window() {
        println!();
        println!("No safe outdoor windows this week. Focus on vitamin D-rich foods or supplements.");
    }
}

fn print_day(profile: &Profile, day: &DailyPlan) {
    match day.date {
        Some(date) => println!("{}", date.format("%A %d %B")),
        None => println!("(undated)"),
    }

    for window in day.windows() {
        print_window(profile, window);
    }
}

fn print_window(profile: &Profile, w: &ExposureWindow) {
    let when = w
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());

    if w.indoor {
        println!(
            "  {:<9} {when}  {} ({} min, indoors)",
            w.day_part, w.activity, w.minutes
        );
    } else {
        let iu = estimate_daily_vitamin_d(profile.skin_type, i64::from(w.minutes), w.uv);
        println!(
            "  {:<9} {when}  {} for {} min  UV {:.1} ({}), {}, {:.0}°C, ~{iu} IU",
            w.day_part,
            w.activity,
            w.minutes,
            w.uv,
            uv_description(w.uv).level,
            w.condition,
            w.temp_c,
        );
    }

    if let Some(warning) = &w.warning {
        println!("            ! {warning}");
    }
}
