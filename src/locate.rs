//! Artifact location - where a service's facade lives

use crate::declaration::ServiceDeclaration;
use crate::error::{Error, Result};
use crate::util::package_to_path;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Suffix appended to the service simple name
pub const FACADE_SUFFIX: &str = "Facade";

/// Identity and on-disk location of a facade artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactIdentity {
    pub target_package: String,
    pub simple_name: String,
    pub path: PathBuf,
}

impl ArtifactIdentity {
    /// Path of the sidecar manifest next to the artifact
    pub fn manifest_path(&self) -> PathBuf {
        let file = format!(".{}.facade.yaml", self.simple_name);
        match self.path.parent() {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Maps declarations onto a generation root
#[derive(Debug, Clone)]
pub struct Locator {
    root: PathBuf,
    extension: String,
}

impl Locator {
    /// A locator needs a generation root; without one nothing can be generated
    pub fn new(root: Option<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let root = root
            .filter(|r| !r.as_os_str().is_empty())
            .ok_or_else(|| Error::Config("generation root is not set".into()))?;
        Ok(Self {
            root,
            extension: extension.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the artifact identity for a declaration
    pub fn locate(&self, service: &ServiceDeclaration) -> ArtifactIdentity {
        let target_package = target_package(service).to_string();
        let simple_name = format!("{}{}", service.simple_name, FACADE_SUFFIX);
        let path = self
            .root
            .join(package_to_path(&target_package))
            .join(format!("{}.{}", simple_name, self.extension));

        ArtifactIdentity {
            target_package,
            simple_name,
            path,
        }
    }
}

/// Override package when non-empty, otherwise the declared package
pub fn target_package(service: &ServiceDeclaration) -> &str {
    match service.override_package.as_deref() {
        Some(pkg) if !pkg.trim().is_empty() => pkg,
        _ => &service.declared_package,
    }
}
