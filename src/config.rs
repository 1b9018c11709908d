//! User settings.
//!
//! Settings live in a small JSON file, by default `~/.taskboard/config.json`.
//! Only settings are persisted; tasks always start from the demo data.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User whose tasks the My Tasks view shows.
    pub current_user: String,
    /// Project made active at startup.
    pub default_project: String,
    /// Filter directive for log output, e.g. `info` or `taskboard=debug`.
    pub log_level: String,
    /// Where the interactive UI writes its log. The UI logs nothing without it.
    pub log_file: Option<PathBuf>,
    pub show_done_on_board: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            current_user: "1".to_string(),
            default_project: "1".to_string(),
            log_level: "warn".to_string(),
            log_file: None,
            show_done_on_board: true,
        }
    }
}

/// Command line values that take precedence over the settings file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub user: Option<String>,
    pub project: Option<String>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let buf = fs::read_to_string(path)?;
        serde_json::from_str(&buf).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(user) = &overrides.user {
            self.current_user = user.clone();
        }
        if let Some(project) = &overrides.project {
            self.default_project = project.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
    }
}

/// `--config` when given, otherwise `$HOME/.taskboard/config.json`.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".taskboard").join("config.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.current_user, "1");
        assert!(settings.show_done_on_board);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let settings = Settings {
            current_user: "2".into(),
            log_file: Some(dir.path().join("tb.log")),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_project": "2" }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.default_project, "2");
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        match Settings::load(&path) {
            Err(Error::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides_win() {
        let mut settings = Settings::default();
        settings.apply(&Overrides {
            user: Some("3".into()),
            project: None,
            log_level: Some("debug".into()),
        });
        assert_eq!(settings.current_user, "3");
        assert_eq!(settings.default_project, "1");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_explicit_path_wins() {
        let p = Path::new("/tmp/custom.json");
        assert_eq!(settings_path(Some(p)), p.to_path_buf());
        assert!(settings_path(None).ends_with(".taskboard/config.json"));
    }
}
