// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const CONFIG_FILE: &str = "dashboard.toml";

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
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataPaths,
    #[serde(default)]
    pub champions: ChampionsConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub factors: FactorsConfig,
}

/// Input file locations, relative to the project root unless absolute.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub matches: String,
    #[serde(default)]
    pub clusters: Option<String>,
    #[serde(default)]
    pub factors: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChampionsConfig {
    pub min_games: usize,
    pub top_n: usize,
}

impl Default for ChampionsConfig {
    fn default() -> Self {
        ChampionsConfig {
            min_games: 18,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub most_played: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig { most_played: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub bins: usize,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig { bins: 20 }
    }
}

/// Display names for factor-table columns, keyed by the CSV header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactorsConfig {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl FactorsConfig {
    /// The display label for a factor column, falling back to the header.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.labels.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataPaths {
                matches: "data/lck_matches.csv".into(),
                clusters: None,
                factors: None,
            },
            champions: ChampionsConfig::default(),
            profile: ProfileConfig::default(),
            distribution: DistributionConfig::default(),
            factors: FactorsConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`load_config`].
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

/// Create `config/dashboard.toml` from `defaults/dashboard.toml` when it is
/// missing. Returns the created path, or `None` when a config already exists.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} or defaults/{CONFIG_FILE} in {}; \
                 run from the project root or pass --root",
                base_dir.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::copy(&source, &target).map_err(copy_err)?;
    Ok(Some(target))
}

/// Create the config from defaults if needed, then load it.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = ensure_config_file(base_dir)? {
        info!("Created {} from defaults", path.display());
    }
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.matches.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.matches".into(),
            message: "must name the match CSV".into(),
        });
    }

    let counts: &[(&str, usize)] = &[
        ("champions.top_n", config.champions.top_n),
        ("profile.most_played", config.profile.most_played),
        ("distribution.bins", config.distribution.bins),
    ];
    for (name, val) in counts {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn defaults_file() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults/dashboard.toml")
    }

    fn write_config(dir: &Path, text: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), text).unwrap();
    }

    #[test]
    fn shipped_defaults_load_and_validate() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(defaults_file(), tmp.path().join("defaults").join(CONFIG_FILE)).unwrap();

        let config = load_config(tmp.path()).expect("defaults should load");
        assert_eq!(config.data.matches, "data/lck_matches.csv");
        assert_eq!(config.data.clusters.as_deref(), Some("data/player_clusters.csv"));
        assert_eq!(config.champions.min_games, 18);
        assert_eq!(config.champions.top_n, 10);
        assert_eq!(config.profile.most_played, 5);
        assert_eq!(config.distribution.bins, 20);
        assert!(config.factors.labels.is_empty());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[data]\nmatches = \"m.csv\"\n");

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.data.clusters, None);
        assert_eq!(config.data.factors, None);
        assert_eq!(config.champions.min_games, 18);
        assert_eq!(config.distribution.bins, 20);
    }

    #[test]
    fn factor_labels_map_headers() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            "[data]\nmatches = \"m.csv\"\n\n[factors.labels]\nFactor1 = \"Laning\"\n",
        );

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.factors.label("Factor1"), "Laning");
        assert_eq!(config.factors.label("Factor2"), "Factor2");
    }

    #[test]
    fn zero_bins_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            "[data]\nmatches = \"m.csv\"\n\n[distribution]\nbins = 0\n",
        );

        let err = load_config_from(tmp.path()).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "distribution.bins");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn missing_data_section_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[champions]\nmin_games = 5\n");

        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn existing_config_is_never_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(defaults_file(), tmp.path().join("defaults").join(CONFIG_FILE)).unwrap();
        write_config(tmp.path(), "[data]\nmatches = \"custom.csv\"\n");

        assert_eq!(ensure_config_file(tmp.path()).unwrap(), None);
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.data.matches, "custom.csv");
    }

    #[test]
    fn missing_config_is_created_from_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(defaults_file(), tmp.path().join("defaults").join(CONFIG_FILE)).unwrap();

        let created = ensure_config_file(tmp.path()).unwrap();
        assert_eq!(created, Some(tmp.path().join("config").join(CONFIG_FILE)));
        assert_eq!(
            fs::read_to_string(tmp.path().join("config").join(CONFIG_FILE)).unwrap(),
            fs::read_to_string(defaults_file()).unwrap()
        );
        // Second call finds the copy.
        assert_eq!(ensure_config_file(tmp.path()).unwrap(), None);
    }

    #[test]
    fn config_without_defaults_dir_still_loads() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[data]\nmatches = \"m.csv\"\n");
        assert_eq!(load_config(tmp.path()).unwrap().data.matches, "m.csv");
    }

    #[test]
    fn no_defaults_and_no_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ensure_config_file(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
    }
}
