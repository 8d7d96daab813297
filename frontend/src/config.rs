use log::LevelFilter;

use crate::services::logging::parse_level;

/// Day thresholds sent to the dashboard to-do endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoThresholds {
    pub kindling_window_days: u32,
    pub wean_age_days: u32,
    pub harvest_age_days: u32,
}

impl Default for TodoThresholds {
    fn default() -> Self {
        Self {
            kindling_window_days: 7,
            wean_age_days: 42,
            harvest_age_days: 84,
        }
    }
}

/// Runtime configuration, read once from `<body>` data attributes
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `data-page`: which page controller to mount
    pub page: Option<String>,
    /// `data-api-base`: prefix for API paths, empty for same origin
    pub api_base: String,
    /// `data-log-level`
    pub log_level: LevelFilter,
    pub toast_ms: u32,
    pub chart_max_points: usize,
    /// Row cap for the dashboard preview tables
    pub preview_rows: usize,
    pub todo: TodoThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page: None,
            api_base: String::new(),
            log_level: LevelFilter::Info,
            toast_ms: 2500,
            chart_max_points: 24,
            preview_rows: 10,
            todo: TodoThresholds::default(),
        }
    }
}

impl AppConfig {
    pub fn from_document() -> Self {
        let body = gloo::utils::body();
        Self::from_attributes(|name| body.get_attribute(name))
    }

    pub fn from_attributes<F>(attr: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            page: attr("data-page").filter(|p| !p.is_empty()),
            api_base: attr("data-api-base").unwrap_or(defaults.api_base),
            log_level: attr("data-log-level")
                .map(|v| parse_level(&v, defaults.log_level))
                .unwrap_or(defaults.log_level),
            ..defaults
        }
    }
}
