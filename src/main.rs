//! Headless runner for the particle field and the project gallery pipeline
//!
//! Run with: cargo run --features cli --bin field-cli
//!
//! Environment:
//! - PARTICLE_FIELD_CONFIG    path to a JSON config (partial allowed)
//! - PARTICLE_FIELD_VIEWPORT  `WIDTHxHEIGHT`, default 1024x768
//! - PARTICLE_FIELD_POINTER   `X,Y` pointer held for the whole run
//! - PARTICLE_FIELD_SECONDS   stop after this many seconds (default: Ctrl-C)
//! - PARTICLE_FIELD_REPOS     path to a saved repository listing; prints the
//!                            gallery as JSON instead of running the field
//! - PARTICLE_FIELD_ACCOUNT   account name the listing belongs to
//! - PARTICLE_FIELD_SEARCH / PARTICLE_FIELD_CATEGORY  gallery query

#[cfg(not(target_arch = "wasm32"))]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> CliResult<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    if let Ok(path) = std::env::var("PARTICLE_FIELD_REPOS") {
        return gallery::run(&path);
    }
    field::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_pair(raw: &str, sep: char) -> Option<(f64, f64)> {
    let (a, b) = raw.split_once(sep)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

#[cfg(not(target_arch = "wasm32"))]
mod field {
    use std::time::Duration;

    use particle_field::core::{FieldConfig, FrameOutcome, FrameStats, ParticleField, RecordingSurface};
    use particle_field::time::now_millis;
    use tracing::info;

    use super::{parse_pair, CliResult};

    /// Display refresh the headless loop imitates; the field throttles itself
    const REFRESH: Duration = Duration::from_micros(16_667);
    const STATS_EVERY: Duration = Duration::from_secs(5);

    fn load_config() -> CliResult<FieldConfig> {
        match std::env::var("PARTICLE_FIELD_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)?;
                let config = FieldConfig::from_json(&json)?;
                info!(path = %path, "Config loaded");
                Ok(config)
            }
            Err(_) => Ok(FieldConfig::default()),
        }
    }

    pub async fn run() -> CliResult<()> {
        let config = load_config()?;

        let (width, height) = match std::env::var("PARTICLE_FIELD_VIEWPORT") {
            Ok(raw) => parse_pair(&raw, 'x').ok_or_else(|| format!("invalid PARTICLE_FIELD_VIEWPORT: {raw}"))?,
            Err(_) => (1024.0, 768.0),
        };
        let pointer = match std::env::var("PARTICLE_FIELD_POINTER") {
            Ok(raw) => Some(parse_pair(&raw, ',').ok_or_else(|| format!("invalid PARTICLE_FIELD_POINTER: {raw}"))?),
            Err(_) => None,
        };
        let deadline = match std::env::var("PARTICLE_FIELD_SECONDS") {
            Ok(raw) => Some(Duration::try_from_secs_f64(raw.parse::<f64>()?)?),
            Err(_) => None,
        };

        let mut field = ParticleField::new(config);
        field.mount(RecordingSurface::new(), width, height, 1.0);
        if let Some((x, y)) = pointer {
            field.set_pointer(x, y);
        }
        info!(
            width,
            height,
            particles = field.particles().len(),
            target_fps = field.config().target_fps,
            "Particle field running headless"
        );

        let started = tokio::time::Instant::now();
        let mut refresh = tokio::time::interval(REFRESH);
        let mut stats_interval = tokio::time::interval(STATS_EVERY);
        stats_interval.tick().await;

        let mut rendered = 0u64;
        let mut skipped = 0u64;
        let mut last = FrameStats::default();

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    match field.tick(now_millis()) {
                        FrameOutcome::Rendered(stats) => {
                            rendered += 1;
                            last = stats;
                        }
                        FrameOutcome::Skipped => skipped += 1,
                    }
                    // The recording surface only needs the latest frame
                    if let Some(surface) = field.surface_mut() {
                        surface.clear_log();
                    }
                    if deadline.is_some_and(|d| started.elapsed() >= d) {
                        break;
                    }
                }
                _ = stats_interval.tick() => {
                    info!(
                        rendered,
                        skipped,
                        "fps" = format!("{:.1}", rendered as f64 / STATS_EVERY.as_secs_f64()),
                        links = last.links,
                        pointer_links = last.pointer_links,
                        booting = last.booting,
                        has_booted = field.has_booted(),
                        "stats"
                    );
                    rendered = 0;
                    skipped = 0;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        field.unmount();
        info!(elapsed_s = started.elapsed().as_secs_f64(), "Stopped");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod gallery {
    use particle_field::core::{collect_pages, Category, ProjectQuery, RepoFilter, RepoRecord};
    use tracing::info;

    use super::CliResult;

    const PER_PAGE: usize = 100;

    /// A saved listing is either one page or an array of pages
    fn load_pages(json: &str) -> Result<Vec<Vec<RepoRecord>>, serde_json::Error> {
        serde_json::from_str::<Vec<Vec<RepoRecord>>>(json)
            .or_else(|_| serde_json::from_str::<Vec<RepoRecord>>(json).map(|page| vec![page]))
    }

    pub fn run(path: &str) -> CliResult<()> {
        let account = std::env::var("PARTICLE_FIELD_ACCOUNT")
            .map_err(|_| "PARTICLE_FIELD_ACCOUNT must be set with PARTICLE_FIELD_REPOS")?;
        let pages = load_pages(&std::fs::read_to_string(path)?)?;

        let repos = collect_pages::<std::convert::Infallible>(PER_PAGE, |page| {
            Ok(pages.get(page as usize - 1).cloned().unwrap_or_default())
        })?;
        let projects = RepoFilter::new(&account).apply(repos);

        let category = match std::env::var("PARTICLE_FIELD_CATEGORY") {
            Ok(raw) => Some(serde_json::from_value::<Category>(serde_json::Value::String(raw))?),
            Err(_) => None,
        };
        let query = ProjectQuery {
            search: std::env::var("PARTICLE_FIELD_SEARCH").unwrap_or_default(),
            category,
        };
        let selected = query.select(&projects);
        info!(account = %account, total = projects.len(), shown = selected.len(), "Gallery built");

        println!("{}", serde_json::to_string_pretty(&selected)?);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
