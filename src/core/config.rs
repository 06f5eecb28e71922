//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::composer::{DEFAULT_SELECTION_LIMIT, HeightMetrics};
use crate::core::normalize::Normalizer;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ComposerConfig {
    pub selection_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NormalizerConfig {
    pub byte_threshold: Option<usize>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

/// Row-based overrides for the composer layout.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    pub padding: Option<u16>,
    pub strip_height: Option<u16>,
    pub max_text_height: Option<u16>,
    pub collapsed_height: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LibraryConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BotConfig {
    pub enabled: Option<bool>,
    pub greeting: Option<String>,
    pub reply_delay_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REPLY_DELAY_MS: u64 = 400;
pub const DEFAULT_GREETING: &str = "Hi! Type a message, or press Ctrl+O to attach images.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub selection_limit: usize,
    pub normalizer: Normalizer,
    pub metrics: HeightMetrics,
    pub library_dir: PathBuf,
    /// `None` when the bot is disabled.
    pub bot: Option<ResolvedBot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBot {
    pub greeting: Option<String>,
    pub reply_delay_ms: u64,
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub library_dir: Option<PathBuf>,
    pub selection_limit: Option<usize>,
    pub no_bot: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `~/.parley/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ParleyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ParleyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ParleyConfig::default());
    }

    let config = load_config_from(&path)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<ParleyConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ParleyConfig = toml::from_str(&contents)?;
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Parley Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [composer]
# selection_limit = 100              # Or set PARLEY_SELECTION_LIMIT

# [normalizer]
# byte_threshold = 13000000          # Images at or above this size are downscaled
# max_width = 1600
# max_height = 1600

# [layout]                           # Composer rows
# padding = 2
# strip_height = 3
# max_text_height = 7
# collapsed_height = 3

# [library]
# dir = "~/Pictures"                 # Or set PARLEY_LIBRARY_DIR

# [bot]
# enabled = true
# greeting = "Hi! Type a message, or press Ctrl+O to attach images."
# reply_delay_ms = 400
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ParleyConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &ParleyConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Selection limit: CLI → env → config → default, never below 1
    let selection_limit = cli
        .selection_limit
        .or_else(|| env("PARLEY_SELECTION_LIMIT").and_then(|v| v.trim().parse().ok()))
        .or(config.composer.selection_limit)
        .unwrap_or(DEFAULT_SELECTION_LIMIT)
        .max(1);

    // Library dir: CLI → env → config → ~/Pictures
    let library_dir = cli
        .library_dir
        .clone()
        .or_else(|| env("PARLEY_LIBRARY_DIR").map(|d| expand_home(&d)))
        .or_else(|| config.library.dir.as_deref().map(expand_home))
        .unwrap_or_else(default_library_dir);

    let defaults = Normalizer::default();
    let normalizer = Normalizer::new(
        config
            .normalizer
            .byte_threshold
            .unwrap_or(defaults.byte_threshold),
        config.normalizer.max_width.unwrap_or(defaults.max_width),
        config.normalizer.max_height.unwrap_or(defaults.max_height),
    );

    let terminal = HeightMetrics::terminal();
    let metrics = HeightMetrics {
        padding: config.layout.padding.unwrap_or(terminal.padding),
        strip_height: config.layout.strip_height.unwrap_or(terminal.strip_height),
        max_text_height: config
            .layout
            .max_text_height
            .unwrap_or(terminal.max_text_height),
        collapsed_height: config
            .layout
            .collapsed_height
            .unwrap_or(terminal.collapsed_height),
        ..terminal
    };

    let bot_enabled = !cli.no_bot && config.bot.enabled.unwrap_or(true);
    let bot = bot_enabled.then(|| ResolvedBot {
        greeting: match config.bot.greeting.as_deref() {
            Some(g) if g.trim().is_empty() => None,
            Some(g) => Some(g.to_string()),
            None => Some(DEFAULT_GREETING.to_string()),
        },
        reply_delay_ms: config
            .bot
            .reply_delay_ms
            .unwrap_or(DEFAULT_REPLY_DELAY_MS),
    });

    ResolvedConfig {
        selection_limit,
        normalizer,
        metrics,
        library_dir,
        bot,
    }
}

fn default_library_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = ParleyConfig::default();
        assert!(config.composer.selection_limit.is_none());
        assert!(config.library.dir.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&ParleyConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.selection_limit, DEFAULT_SELECTION_LIMIT);
        assert_eq!(resolved.normalizer, Normalizer::default());
        assert_eq!(resolved.metrics, HeightMetrics::terminal());
        let bot = resolved.bot.expect("bot enabled by default");
        assert_eq!(bot.greeting.as_deref(), Some(DEFAULT_GREETING));
        assert_eq!(bot.reply_delay_ms, DEFAULT_REPLY_DELAY_MS);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ParleyConfig {
            composer: ComposerConfig {
                selection_limit: Some(5),
            },
            normalizer: NormalizerConfig {
                byte_threshold: Some(1000),
                max_width: Some(800),
                max_height: None,
            },
            layout: LayoutConfig {
                strip_height: Some(4),
                ..Default::default()
            },
            library: LibraryConfig {
                dir: Some("/srv/photos".into()),
            },
            bot: BotConfig {
                enabled: Some(true),
                greeting: Some("".into()),
                reply_delay_ms: Some(0),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.selection_limit, 5);
        assert_eq!(resolved.normalizer, Normalizer::new(1000, 800, 1600));
        assert_eq!(resolved.metrics.strip_height, 4);
        assert_eq!(resolved.metrics.padding, 2);
        assert_eq!(resolved.library_dir, PathBuf::from("/srv/photos"));
        let bot = resolved.bot.unwrap();
        assert_eq!(bot.greeting, None);
        assert_eq!(bot.reply_delay_ms, 0);
    }

    #[test]
    fn test_env_overrides_config() {
        let config = ParleyConfig {
            composer: ComposerConfig {
                selection_limit: Some(5),
            },
            library: LibraryConfig {
                dir: Some("/srv/photos".into()),
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "PARLEY_SELECTION_LIMIT" => Some("9".to_string()),
            "PARLEY_LIBRARY_DIR" => Some("/tmp/pics".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.selection_limit, 9);
        assert_eq!(resolved.library_dir, PathBuf::from("/tmp/pics"));
    }

    #[test]
    fn test_cli_wins() {
        let config = ParleyConfig {
            bot: BotConfig {
                enabled: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            library_dir: Some(PathBuf::from("/cli/dir")),
            selection_limit: Some(3),
            no_bot: true,
        };
        let env = |_: &str| Some("7".to_string());
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.selection_limit, 3);
        assert_eq!(resolved.library_dir, PathBuf::from("/cli/dir"));
        assert!(resolved.bot.is_none());
    }

    #[test]
    fn test_zero_selection_limit_is_raised() {
        let cli = CliOverrides {
            selection_limit: Some(0),
            ..Default::default()
        };
        let resolved = resolve_with_env(&ParleyConfig::default(), &cli, no_env);
        assert_eq!(resolved.selection_limit, 1);
    }

    #[test]
    fn test_unparseable_env_limit_falls_through() {
        let env = |key: &str| (key == "PARLEY_SELECTION_LIMIT").then(|| "lots".to_string());
        let resolved = resolve_with_env(&ParleyConfig::default(), &CliOverrides::default(), env);
        assert_eq!(resolved.selection_limit, DEFAULT_SELECTION_LIMIT);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[normalizer]
max_width = 1024

[bot]
enabled = false
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.normalizer.max_width, Some(1024));
        assert!(config.normalizer.byte_threshold.is_none());
        assert_eq!(config.bot.enabled, Some(false));
        assert!(config.composer.selection_limit.is_none());

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert!(resolved.bot.is_none());
    }

    #[test]
    fn test_load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[composer]\nselection_limit = \"many\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_generated_default_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path);
        let config = load_config_from(&path).unwrap();
        assert!(config.composer.selection_limit.is_none());
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }
}
