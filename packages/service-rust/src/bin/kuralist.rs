//! Kuralist command line.
//!
//! Usage:
//!     kuralist --data schools.json --city Auckland --achievers
//!     kuralist --remote-url https://example.supabase.co --api-key KEY --refresh --options city

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kuralist_core::{
    schools_within, select_favorites, BoundingBox, Category, Coordinates, School, ThresholdFilter,
};
use kuralist_service::logging::init_tracing;
use kuralist_service::{RemoteConfig, ServiceConfig, Services};

#[derive(Parser, Debug)]
#[command(name = "kuralist", about = "Search and filter New Zealand schools")]
struct Args {
    /// Local snapshot file (JSON array of school rows)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Remote project URL
    #[arg(long, env = "KURALIST_REMOTE_URL")]
    remote_url: Option<String>,

    /// Remote API key
    #[arg(long, env = "KURALIST_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Pull the full table from the remote before filtering
    #[arg(long)]
    refresh: bool,

    /// Free-text search over name, suburb, city, authority and type
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    suburb: Option<String>,

    /// School type, e.g. "Secondary (Year 9-15)"
    #[arg(long)]
    level: Option<String>,

    #[arg(long)]
    authority: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Only schools with a Year 13 UE or NCEA pass rate above 70%
    #[arg(long)]
    achievers: bool,

    /// Only schools with international students
    #[arg(long)]
    international: bool,

    /// List the distinct values of a category instead of schools
    #[arg(long, value_name = "CATEGORY")]
    options: Option<Category>,

    /// Only schools inside a box around LAT,LON
    #[arg(long, value_name = "LAT,LON", value_parser = parse_coordinates)]
    near: Option<Coordinates>,

    #[arg(long, default_value_t = 5.0)]
    radius_km: f64,

    /// Favorites file
    #[arg(long)]
    favorites_file: Option<PathBuf>,

    /// Toggle a school number in the favorites
    #[arg(long, value_name = "SCHOOL_NUMBER")]
    toggle_favorite: Option<i64>,

    /// List favorite schools instead of filtering
    #[arg(long)]
    show_favorites: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn parse_coordinates(value: &str) -> Result<Coordinates, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {value:?}"))?;
    let latitude = lat.trim().parse::<f64>().map_err(|e| format!("latitude: {e}"))?;
    let longitude = lon.trim().parse::<f64>().map_err(|e| format!("longitude: {e}"))?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

impl Args {
    fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let remote = match (&self.remote_url, &self.api_key) {
            (Some(url), Some(key)) => Some(RemoteConfig::new(url, key)),
            (Some(_), None) => anyhow::bail!("--remote-url requires --api-key"),
            _ => None,
        };
        Ok(ServiceConfig {
            remote,
            cache_path: self.data.clone(),
            favorites_path: self.favorites_file.clone(),
            ..ServiceConfig::default()
        })
    }

    fn category_filters(&self) -> Vec<(Category, &str)> {
        [
            (Category::City, &self.city),
            (Category::Suburb, &self.suburb),
            (Category::Level, &self.level),
            (Category::Authority, &self.authority),
            (Category::Gender, &self.gender),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.as_deref().map(|v| (category, v)))
        .collect()
    }
}

fn print_schools(schools: &[School], json: bool) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, schools).context("writing JSON")?;
        writeln!(out)?;
        return Ok(());
    }
    for school in schools {
        let location = school.location();
        if location.is_empty() {
            writeln!(out, "{:>6}  {}", school.id, school.school_name)?;
        } else {
            writeln!(out, "{:>6}  {} ({location})", school.id, school.school_name)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    let services = Services::build(&args.service_config()?).await?;
    let loaded = if args.refresh {
        services.sync.resync().await?
    } else {
        services.sync.ensure_loaded().await?
    };
    tracing::info!(loaded, "record set ready");

    if let Some(id) = args.toggle_favorite {
        let now = services.favorites.toggle(id).await?;
        tracing::info!(id, favorite = now, "toggled favorite");
    }

    let snapshot = services.store.snapshot();
    if args.show_favorites {
        let favorites: Vec<School> = select_favorites(snapshot.schools(), &services.favorites.ids())
            .into_iter()
            .cloned()
            .collect();
        print_schools(&favorites, args.json)?;
        services.shutdown().await;
        return Ok(());
    }

    let engine = &services.engine;
    if let Some(category) = args.options {
        let options = engine.request_options(category).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&*options)?);
        } else {
            for option in options.iter() {
                println!("{option}");
            }
        }
        services.shutdown().await;
        return Ok(());
    }

    if let Some(text) = &args.search {
        engine.set_search_text(text.clone());
    }
    for (category, value) in args.category_filters() {
        engine.set_category_filter(category, value);
    }
    if args.achievers {
        engine.toggle_filter(ThresholdFilter::HighAchievers);
    }
    if args.international {
        engine.toggle_filter(ThresholdFilter::InternationalStudents);
    }
    let view = engine.flush().await;

    let schools: Vec<School> = match args.near {
        Some(center) => {
            let bbox = BoundingBox::around(center, args.radius_km);
            schools_within(&view.schools, &bbox).into_iter().cloned().collect()
        }
        None => view.schools.to_vec(),
    };
    print_schools(&schools, args.json)?;
    tracing::info!(shown = schools.len(), total = view.total, "done");

    services.shutdown().await;
    Ok(())
}
