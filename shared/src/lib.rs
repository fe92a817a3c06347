use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod config;
pub mod time;

pub use config::{
    AppSection, CanvasSection, ConfigError, LabelsSection, LayoutSection, MigrationStrategy,
    TimelineConfig, ViewportSection,
};
pub use time::{DurationMs, MS_PER_DAY, TimeMs};

// ===== RECORD TYPES =====

/// Category value that matches every event tagged with more than one category.
pub const MULTI_CATEGORY: &str = "multi";

/// Stable per-session identity of an event; equals its ingestion index.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct EventId(pub usize);

/// Record shape handed over by ingestion, with original-case labels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub time: TimeMs,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub is_key_event: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub id: EventId,
    pub time: TimeMs,
    pub title: String,
    pub notes: String,
    pub source: String,
    pub source_url: Option<String>,
    /// Normalized category keys, in record order.
    pub categories: Vec<String>,
    /// Normalized topic keys, in record order.
    pub topics: Vec<String>,
    pub display_categories: Vec<String>,
    pub display_topics: Vec<String>,
    pub is_key_event: bool,
    /// Set once the marker has been superseded as the active selection.
    pub viewed: bool,
}

impl TimelineEvent {
    pub fn from_record(id: EventId, record: EventRecord) -> Self {
        let display_categories = collect_display_labels(&record.categories);
        let display_topics = collect_display_labels(&record.topics);
        Self {
            id,
            time: record.time,
            title: record.title,
            notes: record.notes,
            source: record.source.trim().to_string(),
            source_url: record.source_url.filter(|url| !url.trim().is_empty()),
            categories: display_categories.iter().map(|c| normalize_label(c)).collect(),
            topics: display_topics.iter().map(|t| normalize_label(t)).collect(),
            display_categories,
            display_topics,
            is_key_event: record.is_key_event,
            viewed: false,
        }
    }

    pub fn is_multi_category(&self) -> bool {
        self.categories.len() > 1
    }

    /// `viewed` only ever goes from false to true.
    pub fn mark_viewed(&mut self) {
        self.viewed = true;
    }
}

/// Assigns ids in ingestion order.
pub fn events_from_records(records: impl IntoIterator<Item = EventRecord>) -> Vec<TimelineEvent> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| TimelineEvent::from_record(EventId(index), record))
        .collect()
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

fn collect_display_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

// ===== FILTER CRITERIA =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

/// A multi-select dropdown: the options it offers and what is ticked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionFilter {
    #[serde(default)]
    pub options: BTreeSet<String>,
    #[serde(default)]
    pub selection: Selection,
}

impl OptionFilter {
    pub fn all(options: BTreeSet<String>) -> Self {
        Self {
            options,
            selection: Selection::All,
        }
    }

    pub fn only<I, S>(options: BTreeSet<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options,
            selection: Selection::Only(selected.into_iter().map(Into::into).collect()),
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// True for "select all" and for every option ticked individually.
    pub fn is_everything_selected(&self) -> bool {
        match &self.selection {
            Selection::All => true,
            Selection::Only(selected) => self.options.is_subset(selected),
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        match &self.selection {
            Selection::All => true,
            Selection::Only(selected) => selected.contains(value),
        }
    }

    fn map_values(self, f: impl Fn(&str) -> String) -> Self {
        let options = self.options.iter().map(|value| f(value)).collect();
        let selection = match self.selection {
            Selection::All => Selection::All,
            Selection::Only(selected) => {
                Selection::Only(selected.iter().map(|value| f(value)).collect())
            }
        };
        Self { options, selection }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    #[serde(default)]
    pub active_categories: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub key_events_enabled: bool,
    #[serde(default)]
    pub topics: OptionFilter,
    #[serde(default)]
    pub sources: OptionFilter,
    #[serde(default)]
    pub key_events_only: bool,
    #[serde(default)]
    pub search_text: String,
}

fn default_true() -> bool {
    true
}

impl FilterCriteria {
    /// Every category active (including "multi"), every topic and source selected.
    pub fn show_everything(options: &FilterOptions) -> Self {
        let mut active_categories = options.categories.clone();
        active_categories.insert(MULTI_CATEGORY.to_string());
        Self {
            active_categories,
            key_events_enabled: true,
            topics: OptionFilter::all(options.topics.clone()),
            sources: OptionFilter::all(options.sources.clone()),
            key_events_only: false,
            search_text: String::new(),
        }
    }

    /// Brings labels into the form events store them in: categories and
    /// topics trimmed and lowercased, sources trimmed.
    pub fn normalized(self) -> Self {
        Self {
            active_categories: self
                .active_categories
                .iter()
                .map(|category| normalize_label(category))
                .collect(),
            topics: self.topics.map_values(normalize_label),
            sources: self.sources.map_values(|source| source.trim().to_string()),
            ..self
        }
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            active_categories: BTreeSet::new(),
            key_events_enabled: true,
            topics: OptionFilter::default(),
            sources: OptionFilter::default(),
            key_events_only: false,
            search_text: String::new(),
        }
    }
}

/// Dropdown contents derived from the complete record set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub categories: BTreeSet<String>,
    pub topics: BTreeSet<String>,
    pub sources: BTreeSet<String>,
}

impl FilterOptions {
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        let mut options = FilterOptions::default();
        for event in events {
            options.categories.extend(event.categories.iter().cloned());
            options.topics.extend(event.topics.iter().cloned());
            if !event.source.is_empty() {
                options.sources.insert(event.source.clone());
            }
        }
        options
    }
}

// ===== GEOMETRY TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LabelAnchor {
    Start,
    Middle,
    End,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarkerGeometry {
    pub event_id: EventId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub is_key_event: bool,
    pub selected: bool,
    pub viewed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabelGeometry {
    pub event_id: EventId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub label_row: usize,
    pub anchor_mode: LabelAnchor,
    pub connector_from_y: f64,
    /// Row lies beyond what the available height can show.
    pub overflow: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub x: f64,
    pub time: TimeMs,
    pub label: String,
}
