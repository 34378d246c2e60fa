//! Configuration module for nib.
//!
//! Provides the typed configuration that maps to `nib.yaml`, with loading,
//! discovery, command-line merging, validation, defaults, template generation
//! and a builder for programmatic use.
//!
//! A [`Config`] is built once per process and passed by reference into the
//! sync engine; nothing reads configuration from global state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Token value written into freshly generated config files.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_API_TOKEN_HERE";

/// Default NodeImage API host.
pub const DEFAULT_API_BASE: &str = "https://api.nodeimage.com";

/// Default number of concurrent downloads.
pub const DEFAULT_WORKERS: usize = 10;

/// File names searched in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAMES: &[&str] = &["nib.yaml", "nib.yml"];

// ---------------------------------------------------------------------------
// Config struct
// ---------------------------------------------------------------------------

/// Top-level configuration for nib.
///
/// Every field is optional in the YAML file; empty values are filled in by
/// [`Config::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NodeImage API token sent as `X-API-Key`.
    pub token: String,
    /// Local sync root. Empty means `<executable dir>/images`.
    pub dir: PathBuf,
    /// Base URL of the NodeImage API.
    pub api_base: String,
    /// Maximum number of concurrent downloads.
    pub workers: usize,
    /// Fail a download when the received byte count differs from the size
    /// declared by the remote listing.
    pub verify_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            dir: default_sync_dir(),
            api_base: DEFAULT_API_BASE.to_string(),
            workers: DEFAULT_WORKERS,
            verify_size: false,
        }
    }
}

/// `<executable dir>/images`, or `./images` when the executable path is unknown.
pub fn default_sync_dir() -> PathBuf {
    executable_dir()
        .map(|dir| dir.join("images"))
        .unwrap_or_else(|| PathBuf::from("./images"))
}

/// Directory containing the running executable.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

// ---------------------------------------------------------------------------
// Loading and discovery
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    ///
    /// An empty file yields the raw (unmerged) empty configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Locate and load the configuration file.
    ///
    /// With an explicit path only that file is considered; otherwise
    /// [`CONFIG_FILE_NAMES`] are tried in `search_dir`. Returns `Ok(None)`
    /// when no candidate exists, and an error when a candidate exists but
    /// cannot be parsed.
    pub fn discover(
        explicit: Option<&Path>,
        search_dir: &Path,
    ) -> anyhow::Result<Option<(PathBuf, Self)>> {
        let candidates: Vec<PathBuf> = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => CONFIG_FILE_NAMES
                .iter()
                .map(|name| search_dir.join(name))
                .collect(),
        };

        for candidate in candidates {
            if candidate.is_file() {
                let config = Self::load(&candidate).map_err(|err| {
                    anyhow::anyhow!("failed to parse {}: {err}", candidate.display())
                })?;
                return Ok(Some((candidate, config)));
            }
        }

        Ok(None)
    }

    /// A configuration with every field unset, as produced by an empty file.
    pub fn empty() -> Self {
        Self {
            token: String::new(),
            dir: PathBuf::new(),
            api_base: String::new(),
            workers: 0,
            verify_size: false,
        }
    }

    /// Whether a usable token is present (non-empty and not the placeholder).
    pub fn has_token(&self) -> bool {
        let token = self.token.trim();
        !token.is_empty() && token != PLACEHOLDER_TOKEN
    }
}

// ---------------------------------------------------------------------------
// Command-line merging
// ---------------------------------------------------------------------------

/// Values supplied on the command line. Unset values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Config {
    /// Apply command-line overrides on top of the file values, then fill in
    /// defaults for anything still unset.
    ///
    /// Command-line values win; empty strings and a zero worker count are
    /// treated as unset.
    pub fn merge(mut self, overrides: &CliOverrides) -> Self {
        if let Some(token) = overrides.token.as_deref().filter(|t| !t.is_empty()) {
            self.token = token.to_string();
        }
        if let Some(dir) = overrides.dir.as_ref().filter(|d| !d.as_os_str().is_empty()) {
            self.dir = dir.clone();
        }
        if let Some(workers) = overrides.workers.filter(|w| *w > 0) {
            self.workers = workers;
        }

        if self.dir.as_os_str().is_empty() {
            self.dir = default_sync_dir();
        }
        if self.workers == 0 {
            self.workers = DEFAULT_WORKERS;
        }
        if self.api_base.trim().is_empty() {
            self.api_base = DEFAULT_API_BASE.to_string();
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Template generation
// ---------------------------------------------------------------------------

/// Render the commented YAML written when no config file exists.
///
/// With `token = None` the placeholder token is used.
pub fn config_template(token: Option<&str>) -> String {
    let (header, token) = match token {
        Some(token) => (
            "# This file was generated from the token given on the command line",
            token,
        ),
        None => (
            "# Replace YOUR_API_TOKEN_HERE with your NodeImage API token",
            PLACEHOLDER_TOKEN,
        ),
    };
    // A JSON string literal is a valid YAML double-quoted scalar.
    let quoted_token =
        serde_json::to_string(token).unwrap_or_else(|_| format!("\"{PLACEHOLDER_TOKEN}\""));

    format!(
        "# nib configuration file
{header}

# API token (required)
token: {quoted_token}

# Local sync directory (optional, default: <program dir>/images)
dir: \"\"

# API base address (optional, default: {DEFAULT_API_BASE})
api_base: \"{DEFAULT_API_BASE}\"

# Number of concurrent downloads (optional, default: {DEFAULT_WORKERS})
workers: {DEFAULT_WORKERS}

# Fail downloads whose byte count differs from the listed size
verify_size: false
"
    )
}

/// Write [`config_template`] to `path` unless a file already exists there.
///
/// Returns `true` when a file was written.
pub fn write_template(path: &Path, token: Option<&str>) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, config_template(token))?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field, e.g. `"workers"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate a merged configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.token.trim().is_empty() {
            errors.push(ValidationError {
                field: "token".into(),
                message: "no API token configured; set it in the config file or pass -t".into(),
            });
        } else if self.token.trim() == PLACEHOLDER_TOKEN {
            errors.push(ValidationError {
                field: "token".into(),
                message: format!("replace the placeholder {PLACEHOLDER_TOKEN} with a real token"),
            });
        }

        if self.workers == 0 {
            errors.push(ValidationError {
                field: "workers".into(),
                message: "must be greater than 0".into(),
            });
        }

        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            errors.push(ValidationError {
                field: "api_base".into(),
                message: format!("must be an http(s) URL, got '{}'", self.api_base),
            });
        }

        if self.dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "dir".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use nib_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .token("my-token")
///     .dir(PathBuf::from("/srv/images"))
///     .workers(4)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn dir(mut self, dir: PathBuf) -> Self {
        self.config.dir = dir;
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.config.api_base = api_base.into();
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn verify_size(mut self, verify: bool) -> Self {
        self.config.verify_size = verify;
        self
    }

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.token.is_empty());
        assert!(cfg.dir.ends_with("images"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.workers, 10);
        assert!(!cfg.verify_size);
    }

    #[test]
    fn default_config_only_fails_on_token() {
        let errors = Config::default().validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "token");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
token: "abc123"
dir: /tmp/nib-images
api_base: "http://localhost:9000"
workers: 4
verify_size: true
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.token, "abc123");
        assert_eq!(cfg.dir, PathBuf::from("/tmp/nib-images"));
        assert_eq!(cfg.api_base, "http://localhost:9000");
        assert_eq!(cfg.workers, 4);
        assert!(cfg.verify_size);
    }

    #[test]
    fn load_partial_yaml_keeps_defaults_for_missing_fields() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"token: only-token\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg.token, "only-token");
        assert_eq!(cfg.workers, DEFAULT_WORKERS);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn load_empty_file_yields_empty_config() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg, Config::empty());
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"workers: [not, a, number]\n").unwrap();
        tmp.flush().unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn generated_template_round_trips_through_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nib.yaml");

        assert!(write_template(&path, Some("tok\"en")).unwrap());
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.token, "tok\"en");
        assert_eq!(cfg.workers, DEFAULT_WORKERS);
        assert!(cfg.dir.as_os_str().is_empty());
    }

    #[test]
    fn write_template_does_not_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nib.yaml");
        std::fs::write(&path, "token: keep-me\n").unwrap();

        assert!(!write_template(&path, None).unwrap());
        assert_eq!(Config::load(&path).unwrap().token, "keep-me");
    }

    #[test]
    fn placeholder_template_is_rejected_by_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nib.yaml");
        write_template(&path, None).unwrap();

        let cfg = Config::load(&path).unwrap().merge(&CliOverrides::default());
        assert!(!cfg.has_token());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "token"));
    }

    // -- Discovery --

    #[test]
    fn discover_prefers_yaml_over_yml() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("nib.yaml"), "token: from-yaml\n").unwrap();
        std::fs::write(dir.path().join("nib.yml"), "token: from-yml\n").unwrap();

        let (path, cfg) = Config::discover(None, dir.path()).unwrap().unwrap();
        assert!(path.ends_with("nib.yaml"));
        assert_eq!(cfg.token, "from-yaml");
    }

    #[test]
    fn discover_falls_back_to_yml() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("nib.yml"), "token: from-yml\n").unwrap();

        let (_, cfg) = Config::discover(None, dir.path()).unwrap().unwrap();
        assert_eq!(cfg.token, "from-yml");
    }

    #[test]
    fn discover_returns_none_when_nothing_found() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::discover(None, dir.path()).unwrap().is_none());

        let missing = dir.path().join("custom.yaml");
        assert!(Config::discover(Some(missing.as_path()), dir.path())
            .unwrap()
            .is_none());
    }

    #[test]
    fn discover_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("nib.yaml"), "workers: nope\n").unwrap();
        assert!(Config::discover(None, dir.path()).is_err());
    }

    // -- Merging --

    #[test]
    fn merge_prefers_command_line_values() {
        let file = ConfigBuilder::new()
            .token("file-token")
            .dir(PathBuf::from("/from/file"))
            .workers(3)
            .build();
        let overrides = CliOverrides {
            token: Some("cli-token".into()),
            dir: Some(PathBuf::from("/from/cli")),
            workers: Some(7),
        };

        let merged = file.merge(&overrides);
        assert_eq!(merged.token, "cli-token");
        assert_eq!(merged.dir, PathBuf::from("/from/cli"));
        assert_eq!(merged.workers, 7);
    }

    #[test]
    fn merge_ignores_empty_overrides_and_fills_defaults() {
        let overrides = CliOverrides {
            token: Some(String::new()),
            dir: None,
            workers: Some(0),
        };
        let merged = Config::empty().merge(&overrides);
        assert!(merged.token.is_empty());
        assert_eq!(merged.workers, DEFAULT_WORKERS);
        assert_eq!(merged.api_base, DEFAULT_API_BASE);
        assert!(merged.dir.ends_with("images"));
    }

    // -- Validation --

    #[test]
    fn validate_catches_zero_workers() {
        let cfg = ConfigBuilder::new().token("t").workers(0).build();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "workers"));
    }

    #[test]
    fn validate_catches_non_http_api_base() {
        let cfg = ConfigBuilder::new()
            .token("t")
            .api_base("ftp://example.com")
            .build();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "api_base"));
    }

    #[test]
    fn builder_output_validates_with_token() {
        let config = ConfigBuilder::new()
            .token("valid")
            .dir(PathBuf::from("/tmp/x"))
            .build();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn builder_output_without_token_fails_validation() {
        let errors = ConfigBuilder::new().build().validate();
        assert_eq!(errors[0].field, "token");
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "workers".into(),
            message: "must be greater than 0".into(),
        };
        assert_eq!(err.to_string(), "workers: must be greater than 0");
    }
}
