//! facadegen configuration
//!
//! Handles loading of `facadegen.yaml` and resolution of the generation
//! root. A session cannot start without a generation root.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "facadegen.yaml";

/// Environment variable overriding the generation root
pub const ROOT_ENV: &str = "FACADEGEN_ROOT";

/// Project configuration (`facadegen.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FacadeConfig {
    /// Base directory under which package directories are created.
    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub generation_root: Option<PathBuf>,

    /// File extension of generated artifacts
    #[serde(default = "default_extension")]
    pub extension: String,

    /// How the facade receives its service instance
    #[serde(default)]
    pub wiring: Wiring,

    /// Write a sidecar manifest next to every artifact
    #[serde(default = "default_true")]
    pub manifest: bool,

    /// Imports appended after the fixed import set
    #[serde(default)]
    pub extra_imports: Vec<String>,
}

fn default_extension() -> String {
    "java".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            generation_root: None,
            extension: default_extension(),
            wiring: Wiring::default(),
            manifest: true,
            extra_imports: Vec::new(),
        }
    }
}

/// Service wiring style of generated facades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Wiring {
    /// `private final` field assigned by a constructor
    #[default]
    Constructor,
    /// `@Autowired` field, no constructor
    Field,
}

impl FacadeConfig {
    /// Load `facadegen.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }
        Self::load(&config_file).map(Some)
    }

    /// Load a config file, resolving a relative generation root against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut config: FacadeConfig = serde_norway::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if let (Some(root), Some(base)) = (config.generation_root.as_ref(), path.parent()) {
            if root.is_relative() {
                config.generation_root = Some(base.join(root));
            }
        }

        Ok(config)
    }

    /// Resolve the generation root
    ///
    /// Precedence: explicit override, then `FACADEGEN_ROOT`, then the config
    /// value. Fails with [`Error::Config`] when none is set.
    pub fn resolve_root(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let env_root = std::env::var_os(ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        pick_root(explicit, env_root, self.generation_root.as_deref())
    }
}

fn pick_root(
    explicit: Option<&Path>,
    env_root: Option<PathBuf>,
    configured: Option<&Path>,
) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(env_root)
        .or_else(|| configured.map(Path::to_path_buf))
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            Error::Config(format!(
                "Cannot determine generation root: pass --root, set {} or add generation_root to {}",
                ROOT_ENV, CONFIG_FILE
            ))
        })
}
