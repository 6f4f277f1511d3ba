//! Deployment configuration loaded from `config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const CONFIG_DIR: &str = "opsboard";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_SCOPE: &str = "localhost";
const DEFAULT_AUTOSAVE_SECS: u64 = 120;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Storage scoping and location.
    #[serde(default)]
    pub storage: StorageConfig,
    /// The allowed set of centers.
    #[serde(default)]
    pub centers: CentersConfig,
    /// Periodic save settings.
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

impl AppConfig {
    /// Load configuration from `path` when given, otherwise from the default
    /// location. A missing file yields the built-in defaults.
    ///
    /// # Errors
    /// Returns an error when an existing file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a known file path.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location for this platform.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    fn validate(&self) -> Result<()> {
        self.centers.ensure_unique_centers()?;
        self.centers.ensure_valid_default()
    }
}

/// Storage scoping and location block.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Scope key namespacing every storage slot, so deployments sharing a
    /// medium do not collide.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Directory the file medium stores its slots in; platform data dir
    /// when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            data_dir: None,
        }
    }
}

impl StorageConfig {
    /// Resolve the directory the file medium should use.
    #[must_use]
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(CONFIG_DIR)))
    }
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_owned()
}

/// A named location tasks can be tied to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CenterDef {
    value: String,
    #[serde(default)]
    label: Option<String>,
}

impl CenterDef {
    /// Construct a center with only a value.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self { value, label: None }
    }

    /// Machine-facing value stored on tasks.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Optional display label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// The allowed set of centers.
#[derive(Debug, Clone, Deserialize)]
pub struct CentersConfig {
    #[serde(default)]
    centers: Vec<CenterDef>,
    #[serde(default)]
    default_center: Option<String>,
}

impl Default for CentersConfig {
    fn default() -> Self {
        Self {
            centers: Self::builtin_centers(),
            default_center: None,
        }
    }
}

impl CentersConfig {
    /// Configuration without center restrictions (used mainly in tests).
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            centers: Vec::new(),
            default_center: None,
        }
    }

    fn builtin_centers() -> Vec<CenterDef> {
        vec![
            CenterDef {
                value: "ghado".into(),
                label: Some("Ghado Center".into()),
            },
            CenterDef {
                value: "zeek".into(),
                label: Some("Zeek Center".into()),
            },
            CenterDef {
                value: "hajeef".into(),
                label: Some("Hajeef Center".into()),
            },
        ]
    }

    /// Construct a configuration from explicit centers.
    #[must_use]
    pub const fn from_centers(centers: Vec<CenterDef>) -> Self {
        Self {
            centers,
            default_center: None,
        }
    }

    /// Returns true when centers are restricted to a configured set.
    #[must_use]
    pub const fn is_restricted(&self) -> bool {
        !self.centers.is_empty()
    }

    /// Iterate over allowed centers (if any).
    #[must_use]
    pub fn centers(&self) -> &[CenterDef] {
        &self.centers
    }

    /// Retrieve the configured default center (if any).
    #[must_use]
    pub fn default_center(&self) -> Option<&str> {
        self.default_center.as_deref()
    }

    /// Find a center by its value.
    #[must_use]
    pub fn find_center(&self, value: &str) -> Option<&CenterDef> {
        self.centers.iter().find(|center| center.value() == value)
    }

    /// Display label for a center value, falling back to the value itself.
    #[must_use]
    pub fn display_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.find_center(value)
            .and_then(CenterDef::label)
            .unwrap_or(value)
    }

    /// Validate that `candidate` is part of the configured set.
    ///
    /// # Errors
    /// Returns an error naming the allowed values when the candidate is not
    /// among them.
    pub fn validate_center(&self, candidate: &str) -> Result<()> {
        if !self.is_restricted() {
            return Ok(());
        }
        if self.find_center(candidate).is_some() {
            return Ok(());
        }
        let hint = self
            .center_hint()
            .map(|hint| format!(" Allowed values: {hint}."))
            .unwrap_or_default();
        bail!("center '{candidate}' is not defined in configuration.{hint}");
    }

    /// Comma-separated list of allowed values for error messages.
    #[must_use]
    pub fn center_hint(&self) -> Option<String> {
        if self.centers.is_empty() {
            None
        } else {
            Some(
                self.centers
                    .iter()
                    .map(CenterDef::value)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        }
    }

    fn ensure_unique_centers(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for center in &self.centers {
            if !seen.insert(center.value()) {
                bail!("center '{}' is defined more than once", center.value());
            }
        }
        Ok(())
    }

    fn ensure_valid_default(&self) -> Result<()> {
        let Some(default) = self.default_center() else {
            return Ok(());
        };
        if !self.is_restricted() || self.find_center(default).is_some() {
            return Ok(());
        }
        bail!("default center '{default}' is not in the configured set");
    }
}

/// Periodic save block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AutosaveConfig {
    /// Seconds between unconditional saves of in-memory state.
    #[serde(default = "default_autosave_secs")]
    pub interval_secs: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_AUTOSAVE_SECS,
        }
    }
}

const fn default_autosave_secs() -> u64 {
    DEFAULT_AUTOSAVE_SECS
}
