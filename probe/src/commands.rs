use crate::load::{load_config_or_default, load_criteria, load_records, parse_date};
use anyhow::{Context, Result, bail};
use engine::{TimeDomain, TimelineSession, clamp_window, visible_ids};
use shared::{
    DurationMs, FilterCriteria, FilterOptions, TimelineConfig, events_from_records,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FrameRequest {
    pub events: PathBuf,
    pub config: Option<PathBuf>,
    pub criteria: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Pretty JSON of one frame after applying the optional criteria and window.
pub fn frame(request: &FrameRequest) -> Result<String> {
    let records = load_records(&request.events)?;
    let config = load_config_or_default(request.config.as_deref())?;
    let canvas = config.canvas.clone();
    let mut session = TimelineSession::new(records, config);

    if request.width.is_some() || request.height.is_some() {
        session.resize(
            request.width.unwrap_or(canvas.width),
            request.height.unwrap_or(canvas.height),
        );
    }
    if let Some(path) = &request.criteria {
        let criteria = with_option_universe(load_criteria(path)?, session.options());
        session.set_criteria(criteria);
    }
    match (&request.start, &request.end) {
        (Some(start), Some(end)) => {
            session.set_domain(TimeDomain::new(parse_date(start)?, parse_date(end)?));
        }
        (None, None) => {}
        _ => bail!("--start and --end must be given together"),
    }

    let frame = session.frame();
    log::info!(
        "frame {} with {} markers and {} labels",
        frame.domain,
        frame.markers.len(),
        frame.labels.len()
    );
    serde_json::to_string_pretty(&frame).context("Failed to serialize frame")
}

/// Ids of the visible events, as a JSON array.
pub fn filter(events: &Path, criteria: Option<&Path>) -> Result<String> {
    let events = events_from_records(load_records(events)?);
    let options = FilterOptions::from_events(&events);
    let criteria = match criteria {
        Some(path) => with_option_universe(load_criteria(path)?, &options),
        None => FilterCriteria::show_everything(&options),
    };
    let ids = visible_ids(&events, &criteria);
    log::info!("{} of {} events visible", ids.len(), events.len());
    serde_json::to_string(&ids).context("Failed to serialize event ids")
}

pub fn clamp(
    start: &str,
    end: &str,
    bounds_start: &str,
    bounds_end: &str,
    min_span_days: Option<i64>,
) -> Result<String> {
    let bounds = TimeDomain::new(parse_date(bounds_start)?, parse_date(bounds_end)?);
    let min_span = match min_span_days {
        Some(days) if days < 0 => bail!("--min-span-days must not be negative"),
        Some(days) => DurationMs::from_days(days),
        None => TimelineConfig::default().viewport.min_span(),
    };
    let clamped = clamp_window(parse_date(start)?, parse_date(end)?, bounds, min_span);
    let summary = serde_json::json!({
        "start": clamped.start().to_string(),
        "end": clamped.end().to_string(),
        "span_days": clamped.span().days(),
    });
    serde_json::to_string_pretty(&summary).context("Failed to serialize clamped domain")
}

/// Default config as TOML, written to `output` when given.
pub fn init_config(output: Option<&Path>) -> Result<String> {
    let text = TimelineConfig::default()
        .to_toml_string()
        .context("Failed to serialize default config")?;
    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            Ok(format!("Wrote default config to {}", path.display()))
        }
        None => Ok(text),
    }
}

/// Dropdown contents always come from the full record set.
fn with_option_universe(criteria: FilterCriteria, options: &FilterOptions) -> FilterCriteria {
    let mut criteria = criteria.normalized();
    criteria.topics.options = options.topics.clone();
    criteria.sources.options = options.sources.clone();
    criteria
}
