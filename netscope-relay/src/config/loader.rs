use std::path::{Path, PathBuf};

use netscope_capture::CaptureConfig;
use tracing::debug;

use super::types::{
    NetscopeConfig, RawCaptureConfig, RawNetscopeConfig, RawRelayConfig, RelayConfig,
};
use crate::error::ConfigError;

/// Environment variable pointing at an alternative project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "NETSCOPE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<NetscopeConfig, ConfigError> {
        let user = Self::user_config_path();
        let project = Self::project_config_path();
        Self::load_layered([user.as_path(), project.as_path()])
    }

    /// Load a stack of config files, later files overriding earlier ones
    ///
    /// Files that do not exist are skipped.
    pub fn load_layered<'a>(
        layers: impl IntoIterator<Item = &'a Path>,
    ) -> Result<NetscopeConfig, ConfigError> {
        let mut raw = RawNetscopeConfig::default();
        for path in layers {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "Loading config layer");
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }
        Ok(Self::finalize(raw))
    }

    /// Load a single config file
    pub fn load_from(path: &Path) -> Result<NetscopeConfig, ConfigError> {
        Ok(Self::finalize(Self::read_raw(path)?))
    }

    /// Per-user config file (`$XDG_CONFIG_HOME/netscope/config.toml`)
    pub fn user_config_path() -> PathBuf {
        netscope_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with NETSCOPE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join(netscope_paths::CONFIG_FILE)
        } else {
            PathBuf::from(".netscope").join(netscope_paths::CONFIG_FILE)
        }
    }

    fn read_raw(path: &Path) -> Result<RawNetscopeConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawNetscopeConfig, overlay: RawNetscopeConfig) -> RawNetscopeConfig {
        RawNetscopeConfig {
            capture: RawCaptureConfig {
                capture_traces: overlay.capture.capture_traces.or(base.capture.capture_traces),
                trace_depth: overlay.capture.trace_depth.or(base.capture.trace_depth),
                max_response_bytes: overlay
                    .capture
                    .max_response_bytes
                    .or(base.capture.max_response_bytes),
            },
            relay: RawRelayConfig {
                max_pending_per_tab: overlay
                    .relay
                    .max_pending_per_tab
                    .or(base.relay.max_pending_per_tab),
                overflow: overlay.relay.overflow.or(base.relay.overflow),
            },
        }
    }

    fn finalize(raw: RawNetscopeConfig) -> NetscopeConfig {
        let capture_defaults = CaptureConfig::default();
        let relay_defaults = RelayConfig::default();
        NetscopeConfig {
            capture: CaptureConfig {
                capture_traces: raw
                    .capture
                    .capture_traces
                    .unwrap_or(capture_defaults.capture_traces),
                trace_depth: raw.capture.trace_depth.unwrap_or(capture_defaults.trace_depth),
                max_response_bytes: raw.capture.max_response_bytes,
            },
            relay: RelayConfig {
                max_pending_per_tab: raw
                    .relay
                    .max_pending_per_tab
                    .unwrap_or(relay_defaults.max_pending_per_tab),
                overflow: raw.relay.overflow.unwrap_or(relay_defaults.overflow),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::OverflowPolicy;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn project_layer_overrides_user_layer() {
        let dir = TempDir::new().unwrap();
        let user = write(
            &dir,
            "user.toml",
            r#"
            [capture]
            trace_depth = 8
            capture_traces = false

            [relay]
            max_pending_per_tab = 50
            "#,
        );
        let project = write(
            &dir,
            "project.toml",
            r#"
            [relay]
            max_pending_per_tab = 10
            overflow = "drop_newest"
            "#,
        );

        let config = ConfigLoader::load_layered([user.as_path(), project.as_path()]).unwrap();

        assert_eq!(config.relay.max_pending_per_tab, 10);
        assert_eq!(config.relay.overflow, OverflowPolicy::DropNewest);
        // Unset in the overlay, so the user value survives
        assert_eq!(config.capture.trace_depth, 8);
        assert!(!config.capture.capture_traces);
    }

    #[test]
    fn missing_layers_are_skipped() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("nope.toml");

        let config = ConfigLoader::load_layered([absent.as_path()]).unwrap();
        assert_eq!(config, NetscopeConfig::default());
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "[relay]\nmax_pending_per_tab = \"lots\"\n");

        let err = ConfigLoader::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn load_from_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::load_from(&dir.path().join("gone.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn project_path_defaults_to_dot_dir() {
        if std::env::var(PROJECT_CONFIG_DIR_ENV).is_err() {
            assert_eq!(
                ConfigLoader::project_config_path(),
                PathBuf::from(".netscope/config.toml")
            );
        }
    }
}
