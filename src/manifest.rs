//! Sidecar manifest next to each facade
//!
//! Stores the ordered method list, a hash per method fragment and the
//! insertion line in `.<Facade>.facade.yaml`. The manifest only counts
//! while the recorded content hash matches the artifact on disk; a
//! hand-edited artifact invalidates it and the engine falls back to
//! reading the text.

use crate::error::{Error, Result};
use crate::locate::ArtifactIdentity;
use crate::render::Fragment;
use crate::util::sha256_hex;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current manifest schema version
pub const MANIFEST_VERSION: u32 = 1;

/// Manifest stored beside a facade artifact
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactManifest {
    /// Schema version for migrations
    pub version: u32,

    /// Qualified name of the service
    pub service: String,

    /// Facade simple name
    pub artifact: String,

    /// SHA-256 of the artifact text this manifest describes
    pub content_hash: String,

    /// 0-based line index of the closing scope line
    pub insertion_line: usize,

    /// Methods in the order they were emitted or appended
    #[serde(default)]
    pub methods: Vec<ManifestEntry>,

    /// When the artifact was last written
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,

    /// facadegen version that wrote this
    pub tool_version: String,
}

/// One method recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ManifestEntry {
    pub name: String,
    pub fragment_hash: String,
}

impl ArtifactManifest {
    /// Manifest for a freshly emitted artifact
    pub fn new(
        service: &str,
        identity: &ArtifactIdentity,
        content: &str,
        insertion_line: usize,
        fragments: &[Fragment],
    ) -> Self {
        Self {
            version: MANIFEST_VERSION,
            service: service.to_string(),
            artifact: identity.simple_name.clone(),
            content_hash: sha256_hex(content),
            insertion_line,
            methods: fragments
                .iter()
                .map(|f| ManifestEntry {
                    name: f.name.clone(),
                    fragment_hash: f.hash.clone(),
                })
                .collect(),
            generated_at: Utc::now(),
            tool_version: crate::VERSION.to_string(),
        }
    }

    /// Record an appended fragment and the new artifact state
    pub fn record_patch(&mut self, fragment: &Fragment, content: &str, insertion_line: usize) {
        self.methods.push(ManifestEntry {
            name: fragment.name.clone(),
            fragment_hash: fragment.hash.clone(),
        });
        self.content_hash = sha256_hex(content);
        self.insertion_line = insertion_line;
        self.generated_at = Utc::now();
        self.tool_version = crate::VERSION.to_string();
    }

    /// Whether the manifest still describes this artifact text
    pub fn matches(&self, content: &str) -> bool {
        self.version == MANIFEST_VERSION && self.content_hash == sha256_hex(content)
    }

    /// Recorded hash of a method, first entry wins for overloads
    pub fn fragment_hash(&self, name: &str) -> Option<&str> {
        self.methods
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.fragment_hash.as_str())
    }

    /// Load the manifest of an artifact, if one exists
    pub fn load(identity: &ArtifactIdentity) -> Result<Option<Self>> {
        Self::load_from(&identity.manifest_path())
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let manifest: ArtifactManifest = serde_norway::from_str(&content).map_err(|e| {
            Error::Other(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(manifest))
    }

    /// Save the manifest next to its artifact
    pub fn save(&self, identity: &ArtifactIdentity) -> Result<()> {
        let path = identity.manifest_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::Io)?;
        }

        let mut content = String::from(
            "# AUTO-GENERATED - DO NOT EDIT\n\
             # Tracks the methods of the facade next to this file\n\n",
        );
        content.push_str(&serde_norway::to_string(self)?);

        std::fs::write(&path, content).map_err(Error::Io)?;
        Ok(())
    }
}
