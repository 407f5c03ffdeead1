use std::{fmt, io::Write, path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use sunplan_core::{
    ClothingCoverage, Config, ExposurePlanner, ExposureTimer, ForecastRequest, Location,
    ProviderId, SkinType, TimerStatus, estimate_daily_vitamin_d, is_good_conditions,
    minutes_for_uv, provider::default_provider_from_config, provider::openmeteo::OpenMeteoProvider,
    recommended_minutes, timer::format_clock, uv_description, vitamin_d_nudge,
};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sunplan", version, about = "Safe sun exposure planner for vitamin D")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set skin type, clothing, location and forecast source interactively.
    Configure,

    /// Show recommended exposure windows for the coming days.
    Plan {
        /// City to plan for; overrides the configured location.
        #[arg(long)]
        city: Option<String>,

        /// Number of forecast days (1-16).
        #[arg(long)]
        days: Option<u8>,

        /// Seed for activity suggestions, for repeatable output.
        #[arg(long)]
        seed: Option<u64>,

        /// Skin type override, e.g. "III" or "I-II".
        #[arg(long)]
        skin: Option<SkinType>,

        /// Clothing override: minimal, normal or covered.
        #[arg(long)]
        clothing: Option<ClothingCoverage>,

        /// Read the forecast from a JSON file instead of the configured provider.
        #[arg(long)]
        forecast_file: Option<PathBuf>,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Describe a UV index.
    Uv {
        /// UV index value.
        index: f64,
    },

    /// Estimate vitamin D from one exposure session.
    VitaminD {
        #[arg(long)]
        minutes: i64,

        #[arg(long)]
        uv: f64,

        /// Defaults to the configured skin type.
        #[arg(long)]
        skin: Option<SkinType>,
    },

    /// Run an exposure countdown in the terminal.
    Timer {
        /// Session length in minutes.
        #[arg(long, conflicts_with = "uv")]
        minutes: Option<u32>,

        /// Derive the session length from the current UV index and your profile.
        #[arg(long)]
        uv: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Plan {
                city,
                days,
                seed,
                skin,
                clothing,
                forecast_file,
                json,
            } => {
                let opts = PlanOptions {
                    city,
                    days,
                    seed,
                    skin,
                    clothing,
                    forecast_file,
                    json,
                };
                plan(opts).await?
            }
            Command::Uv { index } => {
                let desc = uv_description(index);
                println!("UV {index:.1}: {}", desc.level);
                println!("{}", desc.advice);
                if is_good_conditions(index) {
                    println!("Good conditions for vitamin D right now.");
                }
            }
            Command::VitaminD { minutes, uv, skin } => {
                let skin = match skin {
                    Some(s) => s,
                    None => Config::load()?.planner_profile().skin_type,
                };
                let iu = estimate_daily_vitamin_d(skin, minutes, uv);
                println!("Estimated vitamin D: ~{iu} IU (skin type {skin}, {minutes} min at UV {uv:.1})");
            }
            Command::Timer { minutes, uv } => run_timer(minutes, uv).await?,
        }

        Ok(())
    }
}

struct PlanOptions {
    city: Option<String>,
    days: Option<u8>,
    seed: Option<u64>,
    skin: Option<SkinType>,
    clothing: Option<ClothingCoverage>,
    forecast_file: Option<PathBuf>,
    json: bool,
}

async fn plan(opts: PlanOptions) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(path) = opts.forecast_file {
        config.set_forecast_file(path);
        config.set_default_provider(ProviderId::File);
    }

    let mut profile = config.planner_profile();
    if let Some(skin) = opts.skin {
        profile.skin_type = skin;
    }
    if let Some(clothing) = opts.clothing {
        profile.clothing = clothing;
    }

    let location = resolve_location(&config, opts.city.as_deref()).await?;
    let provider = default_provider_from_config(&config)?;
    let request = ForecastRequest {
        location,
        days: opts.days.unwrap_or_else(|| config.forecast_days()),
    };
    debug!(?request, ?profile, "Requesting forecast");

    let forecast = provider.forecast(&request).await?;

    let mut planner = match opts.seed.or(config.activity_seed) {
        Some(seed) => ExposurePlanner::seeded(seed),
        None => ExposurePlanner::default(),
    };
    let weekly = planner.build_weekly_plan(&profile, &forecast.days);

    if opts.json {
        let out = serde_json::to_string_pretty(&weekly).context("Failed to serialize plan")?;
        println!("{out}");
        return Ok(());
    }

    render::print_weekly_plan(&forecast.location_name, &profile, &weekly);

    if let Some(status) = config.profile.vitamin_d_status.as_deref() {
        let nudge = vitamin_d_nudge(status);
        if !nudge.is_empty() {
            println!();
            println!("{nudge}");
        }
    }

    Ok(())
}

async fn resolve_location(config: &Config, city: Option<&str>) -> anyhow::Result<Location> {
    let city = match city {
        Some(city) => city,
        None => {
            if let Some(location) = config.location.coordinates() {
                return Ok(location);
            }
            match config.location.city.as_deref() {
                Some(city) => city,
                None => return Ok(Location::default()),
            }
        }
    };

    // File forecasts carry their own data; the city only names the report.
    if config.default_provider_id()? != ProviderId::OpenMeteo {
        return Ok(Location {
            name: Some(city.to_string()),
            ..Location::default()
        });
    }

    OpenMeteoProvider::from_config(config)?
        .geocode(city)
        .await?
        .with_context(|| format!("Could not find a location named '{city}'"))
}

struct SkinChoice(SkinType);

impl fmt::Display for SkinChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.0.description())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let skin_options: Vec<SkinChoice> = SkinType::all().iter().copied().map(SkinChoice).collect();
    let skin = Select::new("Skin type (Fitzpatrick scale):", skin_options)
        .with_starting_cursor(config.planner_profile().skin_type.ordinal() as usize - 1)
        .prompt()
        .context("Skin type selection cancelled")?;

    let clothing = Select::new(
        "Usual clothing when outdoors:",
        ClothingCoverage::all().to_vec(),
    )
    .prompt()
    .context("Clothing selection cancelled")?;

    config.set_profile(skin.0, clothing);

    let city = Text::new("City (leave empty for Melbourne):")
        .with_default(config.location.city.as_deref().unwrap_or(""))
        .prompt()
        .context("City input cancelled")?;
    let city = city.trim();
    config.location = Default::default();
    if !city.is_empty() {
        config.location.city = Some(city.to_string());
    }

    let provider = Select::new("Forecast source:", ProviderId::all().to_vec())
        .prompt()
        .context("Provider selection cancelled")?;
    if provider == ProviderId::File {
        let path = Text::new("Path to forecast JSON:")
            .prompt()
            .context("Path input cancelled")?;
        if path.trim().is_empty() {
            bail!("A forecast file path is required for the file provider");
        }
        config.set_forecast_file(PathBuf::from(path.trim()));
    }
    config.set_default_provider(provider);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn run_timer(minutes: Option<u32>, uv: Option<f64>) -> anyhow::Result<()> {
    let minutes = match (minutes, uv) {
        (Some(m), _) => m,
        (None, Some(uv)) => {
            let profile = Config::load()?.planner_profile();
            if minutes_for_uv(profile.skin_type, uv) == 0 {
                bail!(
                    "UV {uv:.1} ({}) is not suitable for a vitamin D session",
                    uv_description(uv).level
                );
            }
            recommended_minutes(&profile, uv)
        }
        (None, None) => bail!("Pass --minutes or --uv to size the session"),
    };

    let mut timer = ExposureTimer::default();
    timer.subscribe(|state| {
        print!(
            "\r{}  {:<18} {:>5.1}%",
            format_clock(state.remaining_secs),
            state.status.label(),
            state.progress_pct
        );
        let _ = std::io::stdout().flush();
    });
    timer.select_duration(minutes);
    timer.start();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        if timer.tick().status == TimerStatus::Complete {
            break;
        }
    }
    println!();

    Ok(())
}
