#![forbid(unsafe_code)]

//! Tuning knobs for a virtualized list.
//!
//! [`VirtualListConfig`] carries the uniform item height, the overscan
//! margin and the load-more policy (which edge, how close). Values can be
//! set with builder methods or read from `VLIST_*` environment variables;
//! parse problems are collected as [`ConfigError`] diagnostics rather than
//! aborting, and the offending field keeps its default.

use std::env;
use std::fmt;

use crate::window::is_valid_item_height;

const ENV_ITEM_HEIGHT: &str = "VLIST_ITEM_HEIGHT";
const ENV_OVERSCAN: &str = "VLIST_OVERSCAN";
const ENV_LOAD_EDGE: &str = "VLIST_LOAD_EDGE";
const ENV_LOAD_THRESHOLD: &str = "VLIST_LOAD_THRESHOLD";

/// Default overscan, in items on each side.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Default load-more threshold, in item heights.
pub const DEFAULT_THRESHOLD_ITEMS: f64 = 2.0;

/// Which scroll edge requests more items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadEdge {
    /// Near `scroll_offset == 0` (older chat history above).
    #[default]
    Top,
    /// Near the end of the scrollable extent (feeds, paged tables).
    Bottom,
}

impl LoadEdge {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" | "start" => Some(Self::Top),
            "bottom" | "end" => Some(Self::Bottom),
            _ => None,
        }
    }
}

impl fmt::Display for LoadEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// Distance from the load edge below which the loader fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadThreshold {
    /// Multiple of the item height.
    Items(f64),
    /// Absolute distance in the same unit as the item height.
    Pixels(f64),
}

impl Default for LoadThreshold {
    fn default() -> Self {
        Self::Items(DEFAULT_THRESHOLD_ITEMS)
    }
}

impl LoadThreshold {
    /// Resolve to an absolute distance for a given item height.
    #[must_use]
    pub fn resolve(self, item_height: f64) -> f64 {
        let distance = match self {
            Self::Items(n) => n * item_height,
            Self::Pixels(px) => px,
        };
        if distance.is_finite() && distance > 0.0 {
            distance
        } else {
            0.0
        }
    }

    /// Parse `"2"`/`"2.5"` (items) or `"40px"` (absolute).
    fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim().to_ascii_lowercase();
        let (number, pixels) = match trimmed.strip_suffix("px") {
            Some(n) => (n.trim(), true),
            None => (trimmed.strip_suffix("items").unwrap_or(trimmed.as_str()).trim(), false),
        };
        let parsed = number.parse::<f64>().ok()?;
        if !parsed.is_finite() || parsed < 0.0 {
            return None;
        }
        Some(if pixels {
            Self::Pixels(parsed)
        } else {
            Self::Items(parsed)
        })
    }

    fn raw(self) -> f64 {
        match self {
            Self::Items(n) | Self::Pixels(n) => n,
        }
    }
}

impl fmt::Display for LoadThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(n) => write!(f, "{n} items"),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// Configuration for a [`VirtualList`](crate::list::VirtualList).
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualListConfig {
    /// Uniform height of every item. Must be finite and `> 0`.
    pub item_height: f64,
    /// Extra items rendered above and below the visible range.
    pub overscan: usize,
    /// Edge that triggers the loader.
    pub load_edge: LoadEdge,
    /// How close to the edge the loader fires.
    pub load_threshold: LoadThreshold,
}

impl Default for VirtualListConfig {
    fn default() -> Self {
        Self {
            item_height: 1.0,
            overscan: DEFAULT_OVERSCAN,
            load_edge: LoadEdge::Top,
            load_threshold: LoadThreshold::default(),
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: VirtualListConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl VirtualListConfig {
    /// Config with the given item height and defaults elsewhere.
    #[must_use]
    pub fn new(item_height: f64) -> Self {
        Self {
            item_height,
            ..Self::default()
        }
    }

    /// Set the item height.
    #[must_use]
    pub fn with_item_height(mut self, item_height: f64) -> Self {
        self.item_height = item_height;
        self
    }

    /// Set the overscan amount.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the load edge.
    #[must_use]
    pub fn with_load_edge(mut self, edge: LoadEdge) -> Self {
        self.load_edge = edge;
        self
    }

    /// Set the load threshold.
    #[must_use]
    pub fn with_load_threshold(mut self, threshold: LoadThreshold) -> Self {
        self.load_threshold = threshold;
        self
    }

    /// Absolute load-more distance for the configured item height.
    #[must_use]
    pub fn threshold_distance(&self) -> f64 {
        if is_valid_item_height(self.item_height) {
            self.load_threshold.resolve(self.item_height)
        } else {
            0.0
        }
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Apply `VLIST_*` overrides on top of this config.
    #[must_use]
    pub fn with_env_overrides(self) -> ConfigParse {
        apply_env_with(self, |key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if !is_valid_item_height(self.item_height) {
            errors.push(ConfigError::new(
                "item_height",
                self.item_height.to_string(),
                "must be finite and > 0",
            ));
        }
        let threshold = self.load_threshold.raw();
        if !threshold.is_finite() || threshold < 0.0 {
            errors.push(ConfigError::new(
                "load_threshold",
                self.load_threshold.to_string(),
                "must be finite and >= 0",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Short human-readable summary for debug output.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "item_height={} overscan={} load={}@{}",
            self.item_height, self.overscan, self.load_edge, self.load_threshold
        )
    }
}

/// Parse config using a custom environment lookup.
pub fn from_env_with<F>(get: F) -> ConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    apply_env_with(VirtualListConfig::default(), get)
}

/// Apply environment overrides from a custom lookup on top of `base`.
pub fn apply_env_with<F>(base: VirtualListConfig, mut get: F) -> ConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = base;
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_ITEM_HEIGHT) {
        match parse_f64(&value).filter(|h| is_valid_item_height(*h)) {
            Some(parsed) => config.item_height = parsed,
            None => errors.push(ConfigError::new(
                "item_height",
                value,
                "expected positive number",
            )),
        }
    }

    if let Some(value) = get(ENV_OVERSCAN) {
        match parse_usize(&value) {
            Some(parsed) => config.overscan = parsed,
            None => errors.push(ConfigError::new(
                "overscan",
                value,
                "expected non-negative integer",
            )),
        }
    }

    if let Some(value) = get(ENV_LOAD_EDGE) {
        match LoadEdge::parse(&value) {
            Some(parsed) => config.load_edge = parsed,
            None => errors.push(ConfigError::new("load_edge", value, "expected top|bottom")),
        }
    }

    if let Some(value) = get(ENV_LOAD_THRESHOLD) {
        match LoadThreshold::parse(&value) {
            Some(parsed) => config.load_threshold = parsed,
            None => errors.push(ConfigError::new(
                "load_threshold",
                value,
                "expected <items> or <n>px",
            )),
        }
    }

    ConfigParse { config, errors }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[inline]
fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_reasonable() {
        let cfg = VirtualListConfig::default();
        assert_eq!(cfg.overscan, 3);
        assert_eq!(cfg.load_edge, LoadEdge::Top);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.threshold_distance(), 2.0);
    }

    #[test]
    fn env_overrides_apply_on_top_of_base() {
        let env = env_of(&[(ENV_OVERSCAN, "8")]);
        let base = VirtualListConfig::new(100.0).with_overscan(5);
        let parsed = apply_env_with(base, |key| env.get(key).cloned());
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config.item_height, 100.0);
        assert_eq!(parsed.config.overscan, 8);
    }

    #[test]
    fn threshold_scales_with_item_height() {
        let cfg = VirtualListConfig::new(20.0);
        assert_eq!(cfg.threshold_distance(), 40.0);
        let cfg = cfg.with_load_threshold(LoadThreshold::Pixels(15.0));
        assert_eq!(cfg.threshold_distance(), 15.0);
    }

    #[test]
    fn invalid_item_height_has_zero_threshold() {
        let cfg = VirtualListConfig::new(0.0);
        assert_eq!(cfg.threshold_distance(), 0.0);
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "item_height");
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let cfg = VirtualListConfig::new(10.0).with_load_threshold(LoadThreshold::Items(-1.0));
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors[0].field, "load_threshold");
        assert_eq!(cfg.threshold_distance(), 0.0);
    }

    #[test]
    fn env_overrides_apply() {
        let env = env_of(&[
            ("VLIST_ITEM_HEIGHT", "100"),
            ("VLIST_OVERSCAN", " 5 "),
            ("VLIST_LOAD_EDGE", "Bottom"),
            ("VLIST_LOAD_THRESHOLD", "64px"),
        ]);
        let parse = from_env_with(|key| env.get(key).cloned());
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert_eq!(parse.config.item_height, 100.0);
        assert_eq!(parse.config.overscan, 5);
        assert_eq!(parse.config.load_edge, LoadEdge::Bottom);
        assert_eq!(parse.config.load_threshold, LoadThreshold::Pixels(64.0));
    }

    #[test]
    fn env_threshold_in_items() {
        let env = env_of(&[("VLIST_LOAD_THRESHOLD", "1.5")]);
        let parse = from_env_with(|key| env.get(key).cloned());
        assert_eq!(parse.config.load_threshold, LoadThreshold::Items(1.5));
        let env = env_of(&[("VLIST_LOAD_THRESHOLD", "3items")]);
        let parse = from_env_with(|key| env.get(key).cloned());
        assert_eq!(parse.config.load_threshold, LoadThreshold::Items(3.0));
    }

    #[test]
    fn env_errors_keep_defaults() {
        let env = env_of(&[
            ("VLIST_ITEM_HEIGHT", "0"),
            ("VLIST_OVERSCAN", "-1"),
            ("VLIST_LOAD_EDGE", "left"),
            ("VLIST_LOAD_THRESHOLD", "soon"),
        ]);
        let parse = from_env_with(|key| env.get(key).cloned());
        assert_eq!(parse.config, VirtualListConfig::default());
        let fields: Vec<_> = parse.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["item_height", "overscan", "load_edge", "load_threshold"]
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::new("overscan", "x", "expected non-negative integer");
        assert_eq!(err.to_string(), "overscan=x (expected non-negative integer)");
    }

    #[test]
    fn summary_mentions_policy() {
        let cfg = VirtualListConfig::new(20.0).with_overscan(5);
        let summary = cfg.summary_short();
        assert!(summary.contains("overscan=5"));
        assert!(summary.contains("top@2 items"));
    }
}
