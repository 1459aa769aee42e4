use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use layers::LineStyle;
use routing::TravelMode;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_ROUTE_LINE_WIDTH: &str = "ROUTE_LINE_WIDTH";
pub const ENV_ROUTE_COLOR: &str = "ROUTE_COLOR";
pub const ENV_ROUTE_READINESS_POLL_MS: &str = "ROUTE_READINESS_POLL_MS";
pub const ENV_ROUTE_TRAVEL_MODE: &str = "ROUTE_TRAVEL_MODE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Preferences the surrounding application hands to the renderer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Stroke width of every route line, in pixels.
    pub route_line_width: u32,
    /// Packed ARGB colour of computed routes.
    pub route_color: u32,
    /// How often to re-check whether the routing backend finished starting.
    pub readiness_poll_ms: u64,
    pub travel_mode: TravelMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            route_line_width: 4,
            route_color: 0xFF33_79FF,
            readiness_poll_ms: 100,
            travel_mode: TravelMode::Car,
        }
    }
}

impl RendererConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Apply `ROUTE_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_ROUTE_LINE_WIDTH) {
            self.route_line_width = parse_u32(ENV_ROUTE_LINE_WIDTH, &value)?;
        }
        if let Some(value) = lookup(ENV_ROUTE_COLOR) {
            self.route_color = parse_argb(ENV_ROUTE_COLOR, &value)?;
        }
        if let Some(value) = lookup(ENV_ROUTE_READINESS_POLL_MS) {
            self.readiness_poll_ms = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_ROUTE_READINESS_POLL_MS, &value))?;
        }
        if let Some(value) = lookup(ENV_ROUTE_TRAVEL_MODE) {
            self.travel_mode = value
                .parse()
                .map_err(|_| invalid(ENV_ROUTE_TRAVEL_MODE, &value))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route_line_width == 0 {
            return Err(invalid("route_line_width", "0"));
        }
        if self.readiness_poll_ms == 0 {
            return Err(invalid("readiness_poll_ms", "0"));
        }
        Ok(())
    }

    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms)
    }

    pub fn paints(&self) -> Paints {
        Paints {
            downloading: LineStyle::downloading(self.route_line_width),
            not_valid: LineStyle::not_valid(self.route_line_width),
            route: LineStyle::solid(self.route_color, self.route_line_width),
        }
    }
}

/// The three line styles a route segment can be drawn with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Paints {
    /// Beeline placeholder while the route is computed.
    pub downloading: LineStyle,
    /// Route the backend could not compute.
    pub not_valid: LineStyle,
    pub route: LineStyle,
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn parse_u32(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

/// Accepts `0xAARRGGBB`, `#AARRGGBB`, `#RRGGBB` (opaque) or a decimal number.
fn parse_argb(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('#'));
    match hex {
        Some(digits) if digits.len() == 6 => u32::from_str_radix(digits, 16)
            .map(|rgb| 0xFF00_0000 | rgb)
            .map_err(|_| invalid(key, value)),
        Some(digits) => u32::from_str_radix(digits, 16).map_err(|_| invalid(key, value)),
        None => parse_u32(key, value),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use routing::TravelMode;

    use super::{ConfigError, RendererConfig};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_preferences() {
        let config = RendererConfig::default();
        assert_eq!(config.route_line_width, 4);
        assert_eq!(config.readiness_poll_interval(), Duration::from_millis(100));
        assert_eq!(config.travel_mode, TravelMode::Car);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config =
            RendererConfig::from_json_str(r#"{ "route_line_width": 6, "travel_mode": "bike" }"#)
                .unwrap();
        assert_eq!(config.route_line_width, 6);
        assert_eq!(config.travel_mode, TravelMode::Bike);
        assert_eq!(config.readiness_poll_ms, 100);
    }

    #[test]
    fn json_rejects_zero_width() {
        let err = RendererConfig::from_json_str(r#"{ "route_line_width": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "route_line_width", .. }));
    }

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "readiness_poll_ms": 25 }}"#).unwrap();
        let config = RendererConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.readiness_poll_ms, 25);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RendererConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_apply_on_top() {
        let config = RendererConfig::default()
            .with_overrides(lookup(&[
                ("ROUTE_LINE_WIDTH", "7"),
                ("ROUTE_COLOR", "#00FF00"),
                ("ROUTE_READINESS_POLL_MS", "10"),
                ("ROUTE_TRAVEL_MODE", "foot"),
            ]))
            .unwrap();
        assert_eq!(config.route_line_width, 7);
        assert_eq!(config.route_color, 0xFF00_FF00);
        assert_eq!(config.readiness_poll_ms, 10);
        assert_eq!(config.travel_mode, TravelMode::Foot);
    }

    #[test]
    fn color_accepts_argb_hex_and_decimal() {
        let config = RendererConfig::default()
            .with_overrides(lookup(&[("ROUTE_COLOR", "0x80112233")]))
            .unwrap();
        assert_eq!(config.route_color, 0x8011_2233);

        let config = RendererConfig::default()
            .with_overrides(lookup(&[("ROUTE_COLOR", "255")]))
            .unwrap();
        assert_eq!(config.route_color, 255);
    }

    #[test]
    fn bad_override_is_rejected() {
        let err = RendererConfig::default()
            .with_overrides(lookup(&[("ROUTE_TRAVEL_MODE", "zeppelin")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "ROUTE_TRAVEL_MODE",
                ..
            }
        ));
    }

    #[test]
    fn paints_share_line_width() {
        let paints = RendererConfig {
            route_line_width: 3,
            ..RendererConfig::default()
        }
        .paints();
        assert_eq!(paints.downloading.stroke_width, 3);
        assert_eq!(paints.not_valid.stroke_width, 3);
        assert_eq!(paints.route.stroke_width, 3);
        assert!(paints.downloading.is_dashed());
        assert!(!paints.route.is_dashed());
    }
}
