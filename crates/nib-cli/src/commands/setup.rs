//! Shared command-line options and configuration resolution
//!
//! Every command resolves its [`Config`] the same way:
//! 1. Load `--config`, or `nib.yaml` / `nib.yml` from the working directory
//! 2. Without a file, write a commented template next to the executable
//! 3. Apply command-line overrides and defaults
//! 4. Validate, failing before any network or filesystem work

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use tracing::{debug, info};

use nib_core::config::{executable_dir, write_template, CliOverrides, Config};

use crate::output::OutputFormatter;

/// File name used for generated configuration templates
const TEMPLATE_FILE_NAME: &str = "nib.yaml";

/// Options accepted by every command
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// NodeImage API token (overrides the config file)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Local sync directory (overrides the config file)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Debug logging, including raw API responses
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Resolve the configuration for the current process
pub fn resolve_config(
    args: &GlobalArgs,
    workers: Option<usize>,
    formatter: &dyn OutputFormatter,
) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    resolve_config_in(args, workers, &cwd, executable_dir().as_deref(), formatter)
}

/// [`resolve_config`] with explicit search and template directories
pub fn resolve_config_in(
    args: &GlobalArgs,
    workers: Option<usize>,
    cwd: &Path,
    exe_dir: Option<&Path>,
    formatter: &dyn OutputFormatter,
) -> Result<Config> {
    let cli_token = args.token.as_deref().filter(|t| !t.trim().is_empty());
    let template_path = args
        .config
        .clone()
        .unwrap_or_else(|| exe_dir.unwrap_or(cwd).join(TEMPLATE_FILE_NAME));

    let file_config = match Config::discover(args.config.as_deref(), cwd)? {
        Some((path, config)) => {
            info!(config_path = %path.display(), "Loaded configuration");
            config
        }
        None => {
            debug!(template = %template_path.display(), "No configuration file found");
            if cli_token.is_none() {
                if write_template(&template_path, None)? {
                    formatter.warn(&format!(
                        "Created configuration template at {}",
                        template_path.display()
                    ));
                }
                bail!(
                    "No configuration found. Edit {} and set your API token, or pass --token",
                    template_path.display()
                );
            }
            Config::empty()
        }
    };

    if let Some(token) = cli_token {
        if !file_config.has_token() && write_template(&template_path, Some(token))? {
            formatter.info(&format!(
                "Saved configuration with the given token to {}",
                template_path.display()
            ));
        }
    }

    let overrides = CliOverrides {
        token: args.token.clone(),
        dir: args.dir.clone(),
        workers,
    };
    let config = file_config.merge(&overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            formatter.error(&error.to_string());
        }
        bail!("Invalid configuration ({} error(s))", errors.len());
    }

    debug!(
        dir = %config.dir.display(),
        api_base = %config.api_base,
        workers = config.workers,
        verify_size = config.verify_size,
        "Configuration resolved"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use nib_core::config::PLACEHOLDER_TOKEN;

    use super::*;
    use crate::output::JsonFormatter;

    fn args() -> GlobalArgs {
        GlobalArgs::default()
    }

    /// Formatter recording which channel each message went to
    #[derive(Default)]
    struct Recorder {
        lines: std::sync::Mutex<Vec<(&'static str, String)>>,
    }

    impl Recorder {
        fn push(&self, channel: &'static str, message: &str) {
            self.lines.lock().unwrap().push((channel, message.to_string()));
        }

        fn channels(&self) -> Vec<&'static str> {
            self.lines.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }
    }

    impl OutputFormatter for Recorder {
        fn success(&self, message: &str) {
            self.push("success", message);
        }
        fn error(&self, message: &str) {
            self.push("error", message);
        }
        fn warn(&self, message: &str) {
            self.push("warn", message);
        }
        fn info(&self, message: &str) {
            self.push("info", message);
        }
        fn print_json(&self, value: &serde_json::Value) {
            self.push("json", &value.to_string());
        }
        fn plan(&self, _prepared: &nib_sync::engine::PreparedSync) {}
        fn report(&self, _report: &nib_sync::engine::SyncReport) {}
        fn listing(&self, _index: &nib_core::domain::inventory::RemoteIndex) {}
    }

    #[test]
    fn test_missing_config_writes_template_and_fails() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();

        let err = resolve_config_in(&args(), None, cwd.path(), Some(exe.path()), &JsonFormatter)
            .unwrap_err();

        assert!(err.to_string().contains("No configuration found"));
        let written = std::fs::read_to_string(exe.path().join("nib.yaml")).unwrap();
        assert!(written.contains(PLACEHOLDER_TOKEN));
    }

    #[test]
    fn test_generated_template_is_rejected_until_edited() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        let _ = resolve_config_in(&args(), None, cwd.path(), Some(exe.path()), &JsonFormatter);

        let args = GlobalArgs {
            config: Some(exe.path().join("nib.yaml")),
            ..args()
        };
        let err = resolve_config_in(&args, None, cwd.path(), Some(exe.path()), &JsonFormatter)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_cli_token_without_config_saves_it() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            token: Some("abc123".into()),
            ..args()
        };

        let config =
            resolve_config_in(&args, None, cwd.path(), Some(exe.path()), &JsonFormatter).unwrap();

        assert_eq!(config.token, "abc123");
        let written = std::fs::read_to_string(exe.path().join("nib.yaml")).unwrap();
        assert!(written.contains("\"abc123\""));
    }

    #[test]
    fn test_saved_token_notice_is_informational() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            token: Some("abc123".into()),
            ..args()
        };
        let recorder = Recorder::default();

        resolve_config_in(&args, None, cwd.path(), Some(exe.path()), &recorder).unwrap();

        assert_eq!(recorder.channels(), vec!["info"]);
        assert!(recorder.lines.lock().unwrap()[0].1.contains("Saved configuration"));
    }

    #[test]
    fn test_config_in_working_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        std::fs::write(
            cwd.path().join("nib.yml"),
            "token: file-token\ndir: /srv/images\nworkers: 3\n",
        )
        .unwrap();

        let config =
            resolve_config_in(&args(), None, cwd.path(), Some(exe.path()), &JsonFormatter).unwrap();

        assert_eq!(config.token, "file-token");
        assert_eq!(config.dir, PathBuf::from("/srv/images"));
        assert_eq!(config.workers, 3);
        assert!(!exe.path().join("nib.yaml").exists());
    }

    #[test]
    fn test_command_line_wins() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(
            cwd.path().join("nib.yaml"),
            "token: file-token\ndir: /srv/images\nworkers: 3\n",
        )
        .unwrap();
        let args = GlobalArgs {
            token: Some("cli-token".into()),
            dir: Some(PathBuf::from("/tmp/other")),
            ..args()
        };

        let config =
            resolve_config_in(&args, Some(8), cwd.path(), None, &JsonFormatter).unwrap();

        assert_eq!(config.token, "cli-token");
        assert_eq!(config.dir, PathBuf::from("/tmp/other"));
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn test_cli_token_does_not_overwrite_existing_file() {
        let cwd = tempfile::tempdir().unwrap();
        let path = cwd.path().join("nib.yaml");
        std::fs::write(&path, "dir: /srv/images\n").unwrap();
        let args = GlobalArgs {
            token: Some("cli-token".into()),
            ..args()
        };

        let config = resolve_config_in(&args, None, cwd.path(), Some(cwd.path()), &JsonFormatter)
            .unwrap();

        assert_eq!(config.token, "cli-token");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dir: /srv/images\n");
    }

    #[test]
    fn test_missing_explicit_config_gets_template_there() {
        let cwd = tempfile::tempdir().unwrap();
        let explicit = cwd.path().join("custom.yaml");
        let args = GlobalArgs {
            config: Some(explicit.clone()),
            ..args()
        };

        assert!(resolve_config_in(&args, None, cwd.path(), None, &JsonFormatter).is_err());
        assert!(explicit.is_file());
    }

    #[test]
    fn test_unparseable_config_is_an_error() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join("nib.yaml"), "workers: [not a number\n").unwrap();

        let err = resolve_config_in(&args(), None, cwd.path(), None, &JsonFormatter).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
