use std::path::{Path, PathBuf};

use clustering::ProjectorOptions;
use serde::{Deserialize, Serialize};
use view::{MapStyle, SelectionOptions, ViewMode};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "VISITOR_MAP_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "read config {path:?}: {source}"),
            ConfigError::Parse {
                path: Some(path),
                source,
            } => write!(f, "parse config {path:?}: {source}"),
            ConfigError::Parse { path: None, source } => write!(f, "parse config: {source}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Tunables for the map pipeline. Every field is optional in the JSON form.
///
/// ```json
/// { "clustering": { "radius_px": 80 }, "view_mode": "flat", "style": "dark" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub clustering: ProjectorOptions,
    pub selection: SelectionOptions,
    pub view_mode: ViewMode,
    pub style: MapStyle,
}

impl MapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(payload)
            .map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MapConfig =
            serde_json::from_str(&payload).map_err(|source| ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `explicit`, else the file named by [`CONFIG_ENV`], else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.clustering.cluster;
        if c.radius_px == 0 {
            return Err(ConfigError::Invalid("radius_px must be > 0".to_string()));
        }
        if c.min_cluster_zoom > c.max_cluster_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_cluster_zoom ({}) exceeds max_cluster_zoom ({})",
                c.min_cluster_zoom, c.max_cluster_zoom
            )));
        }
        if !self.selection.focus_zoom.is_finite() {
            return Err(ConfigError::Invalid("focus_zoom must be finite".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MapConfig};
    use pretty_assertions::assert_eq;
    use view::{MapStyle, ViewMode};

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(MapConfig::from_json_str("{}").unwrap(), MapConfig::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg = MapConfig::from_json_str(
            r#"{
                "clustering": { "radius_px": 80, "max_expansion_zoom": 16 },
                "selection": { "focus_zoom": 10 },
                "view_mode": "flat",
                "style": "dark"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.clustering.cluster.radius_px, 80);
        assert_eq!(cfg.clustering.cluster.max_cluster_zoom, 14);
        assert_eq!(cfg.clustering.max_expansion_zoom, 16);
        assert_eq!(cfg.selection.focus_zoom, 10.0);
        assert_eq!(cfg.selection.fly_duration_ms, 1500);
        assert_eq!(cfg.view_mode, ViewMode::Flat);
        assert_eq!(cfg.style, MapStyle::Dark);
    }

    #[test]
    fn rejects_inverted_zoom_range_and_zero_radius() {
        let err = MapConfig::from_json_str(
            r#"{ "clustering": { "min_cluster_zoom": 9, "max_cluster_zoom": 4 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = MapConfig::from_json_str(r#"{ "clustering": { "radius_px": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MapConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MapConfig::load(Some("/definitely/not/here.json".as_ref())).unwrap_err();
        assert!(err.to_string().starts_with("read config"), "{err}");
    }
}
