//! XDG Base Directory paths for netscope.
//!
//! The relay reads its layered configuration from the XDG config
//! directory on every platform, matching tools like gh and kubectl.

use std::path::PathBuf;

/// Name of the per-user configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Get the netscope config directory.
///
/// Returns `$XDG_CONFIG_HOME/netscope` if set, otherwise `~/.config/netscope`.
///
/// # Examples
///
/// ```
/// use netscope_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("netscope"));
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("netscope")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/netscope")
    } else {
        PathBuf::from(".config/netscope")
    }
}

/// Path of the per-user config file inside [`config_dir`].
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_netscope() {
        let path = config_dir();
        assert!(
            path.ends_with("netscope"),
            "config_dir should end with 'netscope'"
        );
    }

    #[test]
    fn user_config_file_lives_in_config_dir() {
        let file = user_config_file();
        assert_eq!(file.file_name().and_then(|n| n.to_str()), Some(CONFIG_FILE));
        assert!(file.parent().is_some_and(|p| p.ends_with("netscope")));
    }
}
