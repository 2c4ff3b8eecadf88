// Configuration loading and parsing (config/dugout.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `[database] path`.
pub const DB_PATH_ENV: &str = "DUGOUT_DB_PATH";

const CONFIG_FILE: &str = "dugout.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub db_path: String,
    pub paths: ResolvedPaths,
}

/// Directories from `[paths]`, resolved against the base directory.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub exports: PathBuf,
    pub images: PathBuf,
    pub logs: PathBuf,
}

// ---------------------------------------------------------------------------
// dugout.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueConfig,
    database: DatabaseSection,
    paths: PathsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Display name of the league created for a fresh store.
    pub name: String,
    /// Roster cap applied to teams whose rows do not carry `max_roster`.
    #[serde(default)]
    pub default_max_roster: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PathsSection {
    exports: String,
    images: String,
    logs: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dugout.toml` relative to `base_dir`.
///
/// Does not copy defaults; see `load_config_in`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let db_path = match std::env::var(DB_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => p,
        _ => resolve_db_path(base_dir, &file.database.path),
    };

    let config = Config {
        league: file.league,
        db_path,
        paths: ResolvedPaths {
            exports: base_dir.join(&file.paths.exports),
            images: base_dir.join(&file.paths.images),
            logs: base_dir.join(&file.paths.logs),
        },
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                info!("copied default config to {}", target.display());
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy missing defaults, then load config from `base_dir`.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, falling back to the per-user data directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let base = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => user_data_dir().ok_or_else(|| ConfigError::FileNotFound {
            path: PathBuf::from("."),
        })?,
    };
    load_config_in(&base)
}

/// Per-user data directory (e.g. `~/.local/share/dugout` on Linux).
pub fn user_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dugout").map(|dirs| dirs.data_dir().to_path_buf())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve_db_path(base_dir: &Path, raw: &str) -> String {
    if raw == ":memory:" || Path::new(raw).is_absolute() {
        raw.to_string()
    } else {
        base_dir.join(raw).to_string_lossy().into_owned()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.league.default_max_roster == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "league.default_max_roster".into(),
            message: "must be greater than 0 when set".into(),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"
[league]
name = "Riverside Sunday League"
default_max_roster = 12

[database]
path = "data/dugout.db"

[paths]
exports = "data/exports"
images = "data/images"
logs = "logs"
"#;

    fn write_config(dir: &Path, text: &str) {
        fs::create_dir_all(dir.join("config")).unwrap();
        fs::write(dir.join("config").join(CONFIG_FILE), text).unwrap();
    }

    #[test]
    fn load_valid_config() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), SAMPLE);

        let config = load_config_from(tmp.path()).expect("should load");
        assert_eq!(config.league.name, "Riverside Sunday League");
        assert_eq!(config.league.default_max_roster, Some(12));
        assert_eq!(config.paths.images, tmp.path().join("data/images"));
        assert_eq!(config.paths.logs, tmp.path().join("logs"));
    }

    #[test]
    fn missing_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[league\nname = ");
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn empty_league_name_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), &SAMPLE.replace("Riverside Sunday League", " "));
        let err = load_config_from(tmp.path()).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "league.name"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn zero_roster_cap_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), &SAMPLE.replace("= 12", "= 0"));
        assert!(matches!(
            load_config_from(tmp.path()),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn memory_db_path_is_not_joined() {
        assert_eq!(resolve_db_path(Path::new("/srv"), ":memory:"), ":memory:");
        assert_eq!(
            resolve_db_path(Path::new("/srv"), "data/x.db"),
            Path::new("/srv/data/x.db").to_string_lossy()
        );
    }

    // ------------------------------------------------------------------
    // ensure_config_files
    // ------------------------------------------------------------------

    #[test]
    fn defaults_are_copied_once() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::write(tmp.path().join("defaults").join(CONFIG_FILE), SAMPLE).unwrap();

        let copied = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(copied.len(), 1);

        // A second call leaves the existing (possibly edited) file alone.
        fs::write(tmp.path().join("config").join(CONFIG_FILE), "edited").unwrap();
        let copied = ensure_config_files(tmp.path()).unwrap();
        assert!(copied.is_empty());
        let text = fs::read_to_string(tmp.path().join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(text, "edited");
    }

    #[test]
    fn no_defaults_and_no_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_config_files(tmp.path()),
            Err(ConfigError::DefaultsCopyError { .. })
        ));
    }

    #[test]
    fn shipped_defaults_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(
            root.join("defaults").join(CONFIG_FILE),
            tmp.path().join("defaults").join(CONFIG_FILE),
        )
        .expect("workspace should ship defaults/dugout.toml");

        let config = load_config_in(tmp.path()).expect("shipped defaults should validate");
        assert!(!config.league.name.is_empty());
    }
}
