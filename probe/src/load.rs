use anyhow::{Context, Result};
use chrono::NaiveDate;
use shared::{EventRecord, FilterCriteria, TimeMs, TimelineConfig};
use std::path::Path;

pub fn load_config(path: &Path) -> Result<TimelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = TimelineConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn load_config_or_default(path: Option<&Path>) -> Result<TimelineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(TimelineConfig::default()),
    }
}

/// A JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<EventRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;

    let records: Vec<EventRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events file: {}", path.display()))?;

    log::info!("loaded {} events from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_criteria(path: &Path) -> Result<FilterCriteria> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read criteria file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse criteria file: {}", path.display()))
}

/// `YYYY-MM-DD`, midnight UTC.
pub fn parse_date(text: &str) -> Result<TimeMs> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text))?;
    Ok(TimeMs::from_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2020-01-10").unwrap(), TimeMs::from_ymd(2020, 1, 10).unwrap());
        assert_eq!(parse_date(" 1999-12-31 ").unwrap(), TimeMs::from_ymd(1999, 12, 31).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        let error = parse_date("10/01/2020").unwrap_err();
        assert!(format!("{:#}", error).contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn loads_records_with_optional_fields_missing() {
        let file = temp_file(
            r#"[
                {"time": 1577836800000, "title": "First", "categories": ["Policy"]},
                {"time": 1580515200000, "title": "Second", "is_key_event": true}
            ]"#,
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].categories, vec!["Policy"]);
        assert!(records[1].is_key_event);
        assert!(records[1].topics.is_empty());
    }

    #[test]
    fn parse_errors_name_the_file() {
        let file = temp_file("{ not json");
        let message = format!("{:#}", load_records(file.path()).unwrap_err());
        assert!(message.contains("Failed to parse events file"));
        assert!(message.contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_files_report_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let message = format!("{:#}", load_config(&missing).unwrap_err());
        assert!(message.contains("Failed to read config file"));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let file = temp_file("[viewport]\nmin_span_days = 7\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.viewport.min_span_days, 7);
        assert_eq!(config.layout.iterations, 150);
        assert_eq!(load_config_or_default(None).unwrap(), TimelineConfig::default());
    }

    #[test]
    fn invalid_config_values_are_reported() {
        let file = temp_file("[layout]\niterations = 0\n");
        let message = format!("{:#}", load_config(file.path()).unwrap_err());
        assert!(message.contains("layout.iterations"));
    }

    #[test]
    fn loads_criteria_with_defaults() {
        let file = temp_file(r#"{"active_categories": ["policy"], "search_text": "tariff"}"#);
        let criteria = load_criteria(file.path()).unwrap();
        assert!(criteria.key_events_enabled);
        assert_eq!(criteria.search_text, "tariff");
    }
}
