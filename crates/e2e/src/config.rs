//! Page-object configuration
//!
//! Everything the navigators need to know about timing and about the markup
//! of the app under test. Values come from code or from a YAML file; the
//! page objects never read the process environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotConfig {
    /// Path opened by the readiness probe when the tab is still blank
    #[serde(default = "default_start_path")]
    pub start_path: String,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub sidebar: SidebarConfig,
}

fn default_start_path() -> String {
    "/".to_string()
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            start_path: default_start_path(),
            timeouts: TimeoutConfig::default(),
            calendar: CalendarConfig::default(),
            sidebar: SidebarConfig::default(),
        }
    }
}

impl PilotConfig {
    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.timeouts.poll_interval_ms == 0 {
            return Err(E2eError::Config("timeouts.poll_interval_ms must be > 0".into()));
        }
        if self.sidebar.expand_attempts == 0 {
            return Err(E2eError::Config("sidebar.expand_attempts must be > 0".into()));
        }
        if self.calendar.day_cell_selector.trim().is_empty() {
            return Err(E2eError::Config("calendar.day_cell_selector is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Visibility wait for a single element
    #[serde(default = "default_element_ms")]
    pub element_ms: u64,

    /// Arrival confirmation after a sidebar navigation
    #[serde(default = "default_section_ms")]
    pub section_ms: u64,

    /// Readiness probe for the layout shell
    #[serde(default = "default_ready_ms")]
    pub ready_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_element_ms() -> u64 {
    10_000
}

fn default_section_ms() -> u64 {
    20_000
}

fn default_ready_ms() -> u64 {
    15_000
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_ms: default_element_ms(),
            section_ms: default_section_ms(),
            ready_ms: default_ready_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn section(&self) -> Duration {
        Duration::from_millis(self.section_ms)
    }

    pub fn ready(&self) -> Duration {
        Duration::from_millis(self.ready_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Markup of the Nebular calendar and the two demo pickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Element whose text is the displayed "Month Year"
    #[serde(default = "default_view_mode_selector")]
    pub view_mode_selector: String,

    #[serde(default = "default_next_selector")]
    pub next_selector: String,

    #[serde(default = "default_prev_selector")]
    pub prev_selector: String,

    #[serde(default = "default_day_cell_selector")]
    pub day_cell_selector: String,

    /// Class carried by cells of the neighbouring months
    #[serde(default = "default_bounding_class")]
    pub bounding_class: String,

    #[serde(default = "default_form_picker_placeholder")]
    pub form_picker_placeholder: String,

    #[serde(default = "default_range_picker_placeholder")]
    pub range_picker_placeholder: String,

    /// Upper bound on page turns for a single pick
    #[serde(default = "default_max_month_steps")]
    pub max_month_steps: usize,
}

fn default_view_mode_selector() -> String {
    "nb-calendar-view-mode".to_string()
}

fn default_next_selector() -> String {
    "nb-calendar-pageable-navigation [data-name=\"chevron-right\"]".to_string()
}

fn default_prev_selector() -> String {
    "nb-calendar-pageable-navigation [data-name=\"chevron-left\"]".to_string()
}

fn default_day_cell_selector() -> String {
    ".day-cell.ng-star-inserted".to_string()
}

fn default_bounding_class() -> String {
    "bounding-month".to_string()
}

fn default_form_picker_placeholder() -> String {
    "Form Picker".to_string()
}

fn default_range_picker_placeholder() -> String {
    "Range Picker".to_string()
}

fn default_max_month_steps() -> usize {
    120
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            view_mode_selector: default_view_mode_selector(),
            next_selector: default_next_selector(),
            prev_selector: default_prev_selector(),
            day_cell_selector: default_day_cell_selector(),
            bounding_class: default_bounding_class(),
            form_picker_placeholder: default_form_picker_placeholder(),
            range_picker_placeholder: default_range_picker_placeholder(),
            max_month_steps: default_max_month_steps(),
        }
    }
}

impl CalendarConfig {
    /// Day cells of the displayed month only
    pub fn current_month_cells(&self) -> String {
        format!("{}:not(.{})", self.day_cell_selector, self.bounding_class)
    }
}

/// Markup of the layout shell and the sidebar menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarConfig {
    #[serde(default = "default_layout_selector")]
    pub layout_selector: String,

    #[serde(default = "default_sidebar_selector")]
    pub sidebar_selector: String,

    /// Card headers of the main content column
    #[serde(default = "default_content_header_selector")]
    pub content_header_selector: String,

    #[serde(default = "default_breadcrumb_selector")]
    pub breadcrumb_selector: String,

    /// Attribute holding a group's expanded flag
    #[serde(default = "default_expanded_attribute")]
    pub expanded_attribute: String,

    #[serde(default = "default_expand_attempts")]
    pub expand_attempts: usize,

    /// Pause between an expand click and re-reading the flag
    #[serde(default = "default_expand_settle_ms")]
    pub expand_settle_ms: u64,
}

fn default_layout_selector() -> String {
    "nb-layout".to_string()
}

fn default_sidebar_selector() -> String {
    "nb-sidebar, aside".to_string()
}

fn default_content_header_selector() -> String {
    "nb-layout-column nb-card-header".to_string()
}

fn default_breadcrumb_selector() -> String {
    "nb-breadcrumb, nav[aria-label=\"breadcrumb\"]".to_string()
}

fn default_expanded_attribute() -> String {
    "aria-expanded".to_string()
}

fn default_expand_attempts() -> usize {
    4
}

fn default_expand_settle_ms() -> u64 {
    150
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            layout_selector: default_layout_selector(),
            sidebar_selector: default_sidebar_selector(),
            content_header_selector: default_content_header_selector(),
            breadcrumb_selector: default_breadcrumb_selector(),
            expanded_attribute: default_expanded_attribute(),
            expand_attempts: default_expand_attempts(),
            expand_settle_ms: default_expand_settle_ms(),
        }
    }
}

impl SidebarConfig {
    pub fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PilotConfig::default();
        assert_eq!(config.start_path, "/");
        assert_eq!(config.timeouts.element(), Duration::from_secs(10));
        assert_eq!(config.timeouts.section(), Duration::from_secs(20));
        assert_eq!(config.timeouts.ready(), Duration::from_secs(15));
        assert_eq!(config.sidebar.expand_attempts, 4);
        assert_eq!(config.sidebar.expand_settle(), Duration::from_millis(150));
        assert_eq!(config.calendar.max_month_steps, 120);
        assert_eq!(
            config.calendar.current_month_cells(),
            ".day-cell.ng-star-inserted:not(.bounding-month)"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
start_path: /pages/iot-dashboard
timeouts:
  section_ms: 5000
calendar:
  max_month_steps: 24
"#;
        let config = PilotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.start_path, "/pages/iot-dashboard");
        assert_eq!(config.timeouts.section_ms, 5000);
        assert_eq!(config.timeouts.element_ms, 10_000);
        assert_eq!(config.calendar.max_month_steps, 24);
        assert_eq!(config.calendar.form_picker_placeholder, "Form Picker");
        assert_eq!(config.sidebar.expanded_attribute, "aria-expanded");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PilotConfig::from_yaml("{}").unwrap();
        assert_eq!(config.sidebar.sidebar_selector, "nb-sidebar, aside");
        assert_eq!(config.timeouts.poll_interval_ms, 100);
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let yaml = "timeouts:\n  poll_interval_ms: 0\n";
        let err = PilotConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = PilotConfig::from_yaml("timeouts: [1, 2").unwrap_err();
        assert!(matches!(err, E2eError::Yaml(_)));
    }
}
