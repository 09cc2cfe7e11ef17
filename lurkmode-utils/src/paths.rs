//! Path utilities for lurkmode
//!
//! Handles XDG Base Directory specification compliance for the config
//! and state directories.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "lurkmode";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/lurkmode` or `~/.config/lurkmode`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(fallback_config_dir)
}

/// Get the main configuration file path
///
/// Location: `$XDG_CONFIG_HOME/lurkmode/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/lurkmode` or `~/.local/state/lurkmode`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(fallback_state_dir)
}

/// Get the log directory
///
/// Location: `$XDG_STATE_HOME/lurkmode/log`
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

// Fallback implementations when ProjectDirs is unavailable

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

fn fallback_config_dir() -> PathBuf {
    home_dir().join(".config").join(APP_NAME)
}

fn fallback_state_dir() -> PathBuf {
    home_dir().join(".local").join("state").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_contains_app_name() {
        let path = config_dir();
        assert!(path.to_string_lossy().contains("lurkmode"));
    }

    #[test]
    fn test_config_file_in_config_dir() {
        let file = config_file();
        assert!(file.starts_with(config_dir()));
        assert_eq!(file.file_name().unwrap().to_str().unwrap(), "config.toml");
    }

    #[test]
    fn test_log_dir_in_state_dir() {
        let log = log_dir();
        assert!(log.starts_with(state_dir()));
        assert!(log.ends_with("log"));
    }

    #[test]
    fn test_fallback_dirs() {
        assert!(fallback_config_dir().to_string_lossy().contains(".config/lurkmode"));
        assert!(fallback_state_dir()
            .to_string_lossy()
            .contains(".local/state/lurkmode"));
    }

    #[test]
    fn test_home_dir_returns_path() {
        assert!(!home_dir().as_os_str().is_empty());
    }
}
