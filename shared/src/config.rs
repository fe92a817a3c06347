use serde::{Deserialize, Serialize};

use crate::time::{DEFAULT_MIN_SPAN_DAYS, DurationMs};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse timeline config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize timeline config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported config version '{0}'")]
    UnsupportedVersion(String),
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TimelineConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub viewport: ViewportSection,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub labels: LabelsSection,
    #[serde(default)]
    pub canvas: CanvasSection,
}

impl TimelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: TimelineConfig = toml::from_str(content)?;
        if config.app.needs_migration() {
            match config.app.migration_strategy() {
                MigrationStrategy::None => {}
                MigrationStrategy::Upgrade(_) => {
                    config.app.version = AppSection::CURRENT_VERSION.to_string();
                }
                MigrationStrategy::Recreate => {
                    return Err(ConfigError::UnsupportedVersion(config.app.version.clone()));
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if self.viewport.min_span_days < 0 {
            return Err(invalid("viewport.min_span_days", "must not be negative"));
        }
        if !(self.viewport.span_hysteresis >= 0.0) {
            return Err(invalid("viewport.span_hysteresis", "must be a non-negative number"));
        }
        if !(self.viewport.keyboard_pan_fraction > 0.0) {
            return Err(invalid("viewport.keyboard_pan_fraction", "must be positive"));
        }
        if self.layout.iterations == 0 {
            return Err(invalid("layout.iterations", "must be at least 1"));
        }
        if !(self.layout.marker_radius > 0.0) {
            return Err(invalid("layout.marker_radius", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.layout.center_y_ratio) {
            return Err(invalid("layout.center_y_ratio", "must be within 0..=1"));
        }
        if !(self.labels.char_width > 0.0) {
            return Err(invalid("labels.char_width", "must be positive"));
        }
        if !(self.labels.row_height > 0.0) {
            return Err(invalid("labels.row_height", "must be positive"));
        }
        if !(self.canvas.width > 0.0) || !(self.canvas.height > 0.0) {
            return Err(invalid("canvas", "width and height must be positive"));
        }
        Ok(())
    }
}

// AppSection carries the config format version so older files can be migrated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    /// Empty when an `[app]` table omits it.
    #[serde(default)]
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        matches!(self.version.as_str(), "1.0.0")
    }

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }

    pub fn migration_strategy(&self) -> MigrationStrategy {
        if self.is_supported_version() {
            return MigrationStrategy::None;
        }
        match self.version.as_str() {
            // Same layout, the version was simply never written
            "" => MigrationStrategy::Upgrade(format!("unversioned -> {}", Self::CURRENT_VERSION)),
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    None,
    Upgrade(String),
    Recreate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewportSection {
    pub min_span_days: i64,
    /// Relative span change below which a zoom is treated as a pure rescale.
    pub span_hysteresis: f64,
    pub keyboard_pan_fraction: f64,
}

impl ViewportSection {
    pub fn min_span(&self) -> DurationMs {
        DurationMs::from_days(self.min_span_days)
    }
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            min_span_days: DEFAULT_MIN_SPAN_DAYS,
            span_hysteresis: 0.005,
            keyboard_pan_fraction: 0.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutSection {
    pub iterations: usize,
    pub marker_radius: f64,
    pub center_y_ratio: f64,
    pub band_padding: f64,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            iterations: 150,
            marker_radius: 8.0,
            center_y_ratio: 0.5,
            band_padding: 4.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LabelsSection {
    pub char_width: f64,
    pub padding: f64,
    pub row_height: f64,
    pub top_margin: f64,
}

impl Default for LabelsSection {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            padding: 6.0,
            row_height: 18.0,
            top_margin: 4.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CanvasSection {
    pub width: f64,
    pub height: f64,
    pub axis_height: f64,
}

impl Default for CanvasSection {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 400.0,
            axis_height: 24.0,
        }
    }
}
