//! Configuration primitives and loader for markdown-rewrite.
//!
//! Settings are resolved from a precedence stack:
//! override flag → working directory → git root → built-in defaults.
//! Each layer is merged field by field and the result is validated into
//! typed structures so the rewrite rules never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".markdown-rewrite.toml";

pub const DEFAULT_IMAGE_DIR: &str = "resource/img";
pub const DEFAULT_TOC_MARKER: &str = "[[_TOC_]]";
pub const DEFAULT_TOC_ANCHOR: &str = "修订记录";
pub const DEFAULT_PROMOTE_LABELS: [&str; 2] = ["修订记录", "名词解释"];
pub const DEFAULT_DAILY_EXTENSION: &str = "md";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub modify: ModifySettings,
    pub daily: DailySettings,
    pub logging: LoggingSettings,
    pub sources: ConfigSources,
}

/// Constants consumed by the `modify` pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifySettings {
    /// Directory canonical image references point into, without a trailing slash.
    pub image_dir: String,
    pub toc_marker: String,
    /// Label of the level-2 heading the TOC marker is inserted before.
    pub toc_anchor: String,
    /// Bolded labels promoted to level-2 headings, in replacement order.
    pub promote_labels: Vec<String>,
}

impl ModifySettings {
    /// Prefix every canonical image link starts with, e.g. `resource/img/`.
    pub fn image_prefix(&self) -> String {
        format!("{}/", self.image_dir)
    }

    /// Literal heading text the TOC marker is anchored to, e.g. `## 修订记录`.
    pub fn anchor_heading(&self) -> String {
        format!("## {}", self.toc_anchor)
    }
}

impl Default for ModifySettings {
    fn default() -> Self {
        ModifySettings {
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
            toc_marker: DEFAULT_TOC_MARKER.to_string(),
            toc_anchor: DEFAULT_TOC_ANCHOR.to_string(),
            promote_labels: DEFAULT_PROMOTE_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
        }
    }
}

/// Settings for daily-note navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailySettings {
    /// File extension (without the dot) stripped before date matching and re-appended after.
    pub extension: String,
}

impl DailySettings {
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }
}

impl Default for DailySettings {
    fn default() -> Self {
        DailySettings {
            extension: DEFAULT_DAILY_EXTENSION.to_string(),
        }
    }
}

/// Logging sinks and verbosity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
    pub file_level: Option<LogLevel>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

impl ConfigSources {
    /// Comma-separated list of the layers that contributed, lowest precedence first.
    pub fn describe(&self) -> String {
        self.layers
            .iter()
            .map(ConfigSource::describe)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(default_source.clone()));

        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            modify: resolved.modify,
            daily: resolved.daily,
            logging: resolved.logging,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

impl Default for Config {
    /// Built-in defaults only; never touches the filesystem.
    fn default() -> Self {
        let working_directory = PathBuf::from(".");
        Config {
            modify: ModifySettings::default(),
            daily: DailySettings::default(),
            logging: LoggingSettings::default(),
            sources: ConfigSources {
                layers: vec![ConfigSource::default(working_directory.clone())],
                working_directory,
            },
        }
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let defaults = ModifySettings::default();
    let modify = ModifyPartial {
        image_dir: Some(Located::new(defaults.image_dir, source.clone())),
        toc_marker: Some(Located::new(defaults.toc_marker, source.clone())),
        toc_anchor: Some(Located::new(defaults.toc_anchor, source.clone())),
        promote_labels: Some(Located::new(defaults.promote_labels, source.clone())),
    };

    let daily = DailyPartial {
        extension: Some(Located::new(
            DEFAULT_DAILY_EXTENSION.to_string(),
            source.clone(),
        )),
    };

    let logging = LoggingPartial {
        level: Some(Located::new(
            LogLevel::default().as_str().to_string(),
            source.clone(),
        )),
        ..LoggingPartial::default()
    };

    PartialConfig {
        modify: Some(modify),
        daily: Some(daily),
        logging: Some(logging),
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    modify: Option<ModifyPartial>,
    daily: Option<DailyPartial>,
    logging: Option<LoggingPartial>,
}

impl PartialConfig {
    fn merge(&mut self, mut other: PartialConfig) {
        if let Some(other_modify) = other.modify.take() {
            match &mut self.modify {
                Some(modify) => modify.merge(other_modify),
                None => self.modify = Some(other_modify),
            }
        }

        if let Some(other_daily) = other.daily.take() {
            match &mut self.daily {
                Some(daily) => daily.merge(other_daily),
                None => self.daily = Some(other_daily),
            }
        }

        if let Some(other_logging) = other.logging.take() {
            match &mut self.logging {
                Some(logging) => logging.merge(other_logging),
                None => self.logging = Some(other_logging),
            }
        }
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::default(PathBuf::from("."));
        let defaults = ModifySettings::default();

        let modify_partial = self.modify.unwrap_or_default();

        let image_dir = modify_partial
            .image_dir
            .unwrap_or_else(|| Located::new(defaults.image_dir.clone(), fallback()));
        let image_dir_value = image_dir.value.trim().trim_end_matches('/').to_string();
        if image_dir_value.is_empty() {
            errors.push(ConfigValidationError::new(
                Some(image_dir.source.clone()),
                "modify.image_dir cannot be empty".into(),
            ));
        } else if image_dir_value.contains(char::is_whitespace) {
            errors.push(ConfigValidationError::new(
                Some(image_dir.source.clone()),
                format!("modify.image_dir cannot contain whitespace (received '{image_dir_value}')"),
            ));
        }

        let toc_marker = modify_partial
            .toc_marker
            .unwrap_or_else(|| Located::new(defaults.toc_marker.clone(), fallback()));
        if toc_marker.value.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                Some(toc_marker.source.clone()),
                "modify.toc_marker cannot be empty".into(),
            ));
        }

        let toc_anchor = modify_partial
            .toc_anchor
            .unwrap_or_else(|| Located::new(defaults.toc_anchor.clone(), fallback()));
        if toc_anchor.value.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                Some(toc_anchor.source.clone()),
                "modify.toc_anchor cannot be empty".into(),
            ));
        }

        let promote_labels = modify_partial
            .promote_labels
            .unwrap_or_else(|| Located::new(defaults.promote_labels.clone(), fallback()));
        for (idx, label) in promote_labels.value.iter().enumerate() {
            if label.trim().is_empty() {
                errors.push(ConfigValidationError::new(
                    Some(promote_labels.source.clone()),
                    format!("modify.promote_labels[{idx}] cannot be empty"),
                ));
            }
        }

        let daily_partial = self.daily.unwrap_or_default();
        let extension = daily_partial.extension.unwrap_or_else(|| {
            Located::new(DEFAULT_DAILY_EXTENSION.to_string(), fallback())
        });
        let extension_value = extension.value.trim().trim_start_matches('.').to_string();
        if extension_value.is_empty() {
            errors.push(ConfigValidationError::new(
                Some(extension.source.clone()),
                "daily.extension cannot be empty".into(),
            ));
        }

        let logging_partial = self.logging.unwrap_or_default();
        let level = match logging_partial.level {
            Some(located) => parse_level(&located, "logging.level", &mut errors),
            None => Some(LogLevel::default()),
        };
        let file_level = logging_partial
            .file_level
            .as_ref()
            .and_then(|located| parse_level(located, "logging.file_level", &mut errors));
        let file = logging_partial.file.as_ref().map(resolve_path);

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            modify: ModifySettings {
                image_dir: image_dir_value,
                toc_marker: toc_marker.value,
                toc_anchor: toc_anchor.value.trim().to_string(),
                promote_labels: promote_labels.value,
            },
            daily: DailySettings {
                extension: extension_value,
            },
            logging: LoggingSettings {
                level: level.unwrap_or_default(),
                file,
                file_level,
            },
        })
    }
}

#[derive(Clone, Debug, Default)]
struct ModifyPartial {
    image_dir: Option<Located<String>>,
    toc_marker: Option<Located<String>>,
    toc_anchor: Option<Located<String>>,
    promote_labels: Option<Located<Vec<String>>>,
}

impl ModifyPartial {
    fn merge(&mut self, other: ModifyPartial) {
        if other.image_dir.is_some() {
            self.image_dir = other.image_dir;
        }
        if other.toc_marker.is_some() {
            self.toc_marker = other.toc_marker;
        }
        if other.toc_anchor.is_some() {
            self.toc_anchor = other.toc_anchor;
        }
        if other.promote_labels.is_some() {
            self.promote_labels = other.promote_labels;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct DailyPartial {
    extension: Option<Located<String>>,
}

impl DailyPartial {
    fn merge(&mut self, other: DailyPartial) {
        if other.extension.is_some() {
            self.extension = other.extension;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct LoggingPartial {
    level: Option<Located<String>>,
    file: Option<Located<PathBuf>>,
    file_level: Option<Located<String>>,
}

impl LoggingPartial {
    fn merge(&mut self, other: LoggingPartial) {
        if other.level.is_some() {
            self.level = other.level;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
        if other.file_level.is_some() {
            self.file_level = other.file_level;
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

fn parse_level(
    located: &Located<String>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<LogLevel> {
    match located.value.parse::<LogLevel>() {
        Ok(level) => Some(level),
        Err(message) => {
            errors.push(
                ConfigValidationError::new(Some(located.source.clone()), message)
                    .with_context(context),
            );
            None
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    modify: ModifySettings,
    daily: DailySettings,
    logging: LoggingSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    modify: Option<RawModify>,
    #[serde(default)]
    daily: Option<RawDaily>,
    #[serde(default)]
    logging: Option<RawLogging>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            modify: self.modify.map(|modify| modify.into_partial(&source)),
            daily: self.daily.map(|daily| daily.into_partial(&source)),
            logging: self.logging.map(|logging| logging.into_partial(&source)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModify {
    #[serde(default)]
    image_dir: Option<String>,
    #[serde(default)]
    toc_marker: Option<String>,
    #[serde(default)]
    toc_anchor: Option<String>,
    #[serde(default)]
    promote_labels: Option<Vec<String>>,
}

impl RawModify {
    fn into_partial(self, source: &ConfigSource) -> ModifyPartial {
        let locate = |value| Located::new(value, source.clone());
        ModifyPartial {
            image_dir: self.image_dir.map(locate),
            toc_marker: self.toc_marker.map(locate),
            toc_anchor: self.toc_anchor.map(locate),
            promote_labels: self
                .promote_labels
                .map(|labels| Located::new(labels, source.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDaily {
    #[serde(default)]
    extension: Option<String>,
}

impl RawDaily {
    fn into_partial(self, source: &ConfigSource) -> DailyPartial {
        DailyPartial {
            extension: self
                .extension
                .map(|extension| Located::new(extension, source.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    file_level: Option<String>,
}

impl RawLogging {
    fn into_partial(self, source: &ConfigSource) -> LoggingPartial {
        LoggingPartial {
            level: self.level.map(|level| Located::new(level, source.clone())),
            file: self.file.map(|file| Located::new(file, source.clone())),
            file_level: self
                .file_level
                .map(|level| Located::new(level, source.clone())),
        }
    }
}
