//! Notification configuration
//!
//! Every field has a default, so hosts only override what they need. A
//! configuration can also be loaded from TOML:
//!
//! ```toml
//! template = "ui/toast.prefab"
//!
//! [colors]
//! success = [0.2, 0.72, 0.35, 1.0]
//!
//! [layout]
//! element_height = 60.0
//! spacing = 10.0
//! spawn_offset = 150.0
//! slot_count = 10
//! min_font_size = 14.0
//! max_font_size = 24.0
//!
//! [timing]
//! show_duration = 0.5      # seconds
//! display_duration = 2.0
//! hide_duration = 0.5
//! dispatch_interval_ms = 10
//! duplicate_window_ms = 1000
//! cleanup_interval_ms = 10000
//!
//! [queue]
//! capacity = 100
//! ```

use crate::error::{NotifyError, Result};
use crate::notification::Severity;
use crate::slots::SlotLayout;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Background colors per severity (RGBA)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityColors {
    /// Success color
    pub success: [f32; 4],
    /// Warning color
    pub warning: [f32; 4],
    /// Error color
    pub error: [f32; 4],
}

impl SeverityColors {
    /// Color for a severity
    pub fn get(&self, severity: Severity) -> [f32; 4] {
        match severity {
            Severity::Success => self.success,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }
}

impl Default for SeverityColors {
    fn default() -> Self {
        Self {
            success: Severity::Success.default_color(),
            warning: Severity::Warning.default_color(),
            error: Severity::Error.default_color(),
        }
    }
}

/// Notification controller configuration
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Background colors
    pub colors: SeverityColors,
    /// Height of one notification
    pub element_height: f32,
    /// Smallest font size the renderer may shrink text to
    pub min_font_size: f32,
    /// Largest font size the renderer may grow text to
    pub max_font_size: f32,
    /// Show (slide in) animation length in seconds
    pub show_duration: f32,
    /// Time on screen before hiding, in seconds
    pub display_duration: f32,
    /// Hide (slide out) animation length in seconds
    pub hide_duration: f32,
    /// Gap between stacked notifications
    pub spacing: f32,
    /// Distance from the anchor edge to the first slot
    pub spawn_offset: f32,
    /// Number of vertical slots
    pub slot_count: usize,
    /// Time between dispatches; zero drains everything each update
    pub dispatch_interval: Duration,
    /// Identical messages within this window are suppressed
    pub duplicate_window: Duration,
    /// How often stale duplicate records are pruned
    pub cleanup_interval: Duration,
    /// Maximum pending notifications
    pub queue_capacity: usize,
    /// Renderer template name; `None` uses the renderer's default visual
    pub template: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            colors: SeverityColors::default(),
            element_height: 60.0,
            min_font_size: 14.0,
            max_font_size: 24.0,
            show_duration: 0.5,
            display_duration: 2.0,
            hide_duration: 0.5,
            spacing: 10.0,
            spawn_offset: 150.0,
            slot_count: 10,
            dispatch_interval: Duration::from_millis(10),
            duplicate_window: Duration::from_millis(1000),
            cleanup_interval: Duration::from_secs(10),
            queue_capacity: 100,
            template: None,
        }
    }
}

impl NotifyConfig {
    /// Parse a TOML document, filling missing fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: ConfigToml = toml::from_str(content)?;
        let config = raw.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(invalid("queue_capacity must be at least 1"));
        }
        if self.slot_count == 0 {
            return Err(invalid("slot_count must be at least 1"));
        }
        if self.cleanup_interval.is_zero() {
            return Err(invalid("cleanup_interval must be positive"));
        }
        if !(self.min_font_size > 0.0 && self.min_font_size <= self.max_font_size) {
            return Err(invalid(format!(
                "font size range {}..{} is invalid",
                self.min_font_size, self.max_font_size
            )));
        }

        let geometry = [
            ("element_height", self.element_height),
            ("spacing", self.spacing),
            ("spawn_offset", self.spawn_offset),
            ("display_duration", self.display_duration),
        ];
        for (name, value) in geometry {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be finite and non-negative, got {}", name, value)));
            }
        }

        if self.template.as_deref() == Some("") {
            return Err(invalid("template name must not be empty"));
        }

        Ok(())
    }

    /// Slot geometry derived from this config
    pub fn layout(&self) -> SlotLayout {
        SlotLayout {
            element_height: self.element_height,
            spacing: self.spacing,
            spawn_offset: self.spawn_offset,
        }
    }

    /// Set queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the duplicate suppression window
    pub fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }

    /// Set the dispatch pacing interval
    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    /// Set the renderer template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

fn invalid(message: impl Into<String>) -> NotifyError {
    NotifyError::InvalidConfig(message.into())
}

/// Raw TOML structure for colors section
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ColorsToml {
    success: Option<[f32; 4]>,
    warning: Option<[f32; 4]>,
    error: Option<[f32; 4]>,
}

/// Raw TOML structure for layout section
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LayoutToml {
    element_height: Option<f32>,
    spacing: Option<f32>,
    spawn_offset: Option<f32>,
    slot_count: Option<usize>,
    min_font_size: Option<f32>,
    max_font_size: Option<f32>,
}

/// Raw TOML structure for timing section
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TimingToml {
    show_duration: Option<f32>,
    display_duration: Option<f32>,
    hide_duration: Option<f32>,
    dispatch_interval_ms: Option<u64>,
    duplicate_window_ms: Option<u64>,
    cleanup_interval_ms: Option<u64>,
}

/// Raw TOML structure for queue section
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct QueueToml {
    capacity: Option<usize>,
}

/// Root TOML structure
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    template: Option<String>,
    #[serde(default)]
    colors: ColorsToml,
    #[serde(default)]
    layout: LayoutToml,
    #[serde(default)]
    timing: TimingToml,
    #[serde(default)]
    queue: QueueToml,
}

impl ConfigToml {
    fn into_config(self) -> NotifyConfig {
        let d = NotifyConfig::default();

        NotifyConfig {
            colors: SeverityColors {
                success: self.colors.success.unwrap_or(d.colors.success),
                warning: self.colors.warning.unwrap_or(d.colors.warning),
                error: self.colors.error.unwrap_or(d.colors.error),
            },
            element_height: self.layout.element_height.unwrap_or(d.element_height),
            min_font_size: self.layout.min_font_size.unwrap_or(d.min_font_size),
            max_font_size: self.layout.max_font_size.unwrap_or(d.max_font_size),
            show_duration: self.timing.show_duration.unwrap_or(d.show_duration),
            display_duration: self.timing.display_duration.unwrap_or(d.display_duration),
            hide_duration: self.timing.hide_duration.unwrap_or(d.hide_duration),
            spacing: self.layout.spacing.unwrap_or(d.spacing),
            spawn_offset: self.layout.spawn_offset.unwrap_or(d.spawn_offset),
            slot_count: self.layout.slot_count.unwrap_or(d.slot_count),
            dispatch_interval: self
                .timing
                .dispatch_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(d.dispatch_interval),
            duplicate_window: self
                .timing
                .duplicate_window_ms
                .map(Duration::from_millis)
                .unwrap_or(d.duplicate_window),
            cleanup_interval: self
                .timing
                .cleanup_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(d.cleanup_interval),
            queue_capacity: self.queue.capacity.unwrap_or(d.queue_capacity),
            template: self.template,
        }
    }
}
