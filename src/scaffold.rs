//! Demo project scaffold
//!
//! Writes a small Spring Boot project wired for MCP tools: build file,
//! README, application entry point, server configuration, one annotated
//! service and an SSE client test. Pure template expansion with no
//! incremental state.

use crate::error::{Error, Result};
use crate::templates::context::ScaffoldContext;
use crate::templates::{self, names};
use crate::util::package_to_path;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_VERSION: &str = "0.0.1-SNAPSHOT";
pub const DEFAULT_FRAMEWORK_VERSION: &str = "3.4.4";
pub const DEFAULT_LIBRARY_VERSION: &str = "1.0.0";

/// Version of the annotations artifact the generated project depends on
pub const ANNOTATIONS_VERSION: &str = "1.0.1";

/// Parameters of a scaffold run
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    pub output_root: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Spring Boot version
    pub framework_version: String,
    /// Spring AI version
    pub library_version: String,
    /// Write into an existing non-empty project directory
    pub force: bool,
}

impl ScaffoldRequest {
    pub fn new(
        output_root: impl Into<PathBuf>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: DEFAULT_VERSION.to_string(),
            framework_version: DEFAULT_FRAMEWORK_VERSION.to_string(),
            library_version: DEFAULT_LIBRARY_VERSION.to_string(),
            force: false,
        }
    }

    /// Directory the project is written to
    pub fn project_dir(&self) -> PathBuf {
        self.output_root.join(&self.artifact_id)
    }

    fn validate(&self) -> Result<()> {
        let valid_package = !self.group_id.is_empty()
            && self.group_id.split('.').all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !valid_package {
            return Err(Error::Config(format!(
                "group id '{}' is not a valid Java package name",
                self.group_id
            )));
        }
        if self.artifact_id.trim().is_empty() || self.artifact_id.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "artifact id '{}' is not a valid directory name",
                self.artifact_id
            )));
        }
        Ok(())
    }

    fn context(&self) -> ScaffoldContext {
        ScaffoldContext {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
            framework_version: self.framework_version.clone(),
            library_version: self.library_version.clone(),
            annotations_version: ANNOTATIONS_VERSION.to_string(),
        }
    }
}

/// Generate the demo project, returning the files written
pub fn scaffold(request: &ScaffoldRequest) -> Result<Vec<PathBuf>> {
    request.validate()?;

    let project = request.project_dir();
    if !request.force && is_non_empty_dir(&project) {
        return Err(Error::Config(format!(
            "{} already exists and is not empty",
            project.display()
        )));
    }

    let package = package_to_path(&request.group_id);
    let main_java = project.join("src/main/java").join(&package);
    let test_java = project.join("src/test/java").join(&package);

    let outputs = [
        (names::POM, project.join("pom.xml")),
        (names::README, project.join("README.md")),
        (names::FACADEGEN_YAML, project.join(crate::config::CONFIG_FILE)),
        (names::APPLICATION, main_java.join("McpDemoApplication.java")),
        (names::SERVER_CONFIG, main_java.join("config/McpServerConfig.java")),
        (names::WEATHER_SERVICE, main_java.join("service/WeatherService.java")),
        (names::CLIENT_TEST, test_java.join("ClientSseTest.java")),
        (
            names::PROPERTIES,
            project.join("src/main/resources/application.properties"),
        ),
    ];

    let ctx = request.context();
    let mut written = Vec::with_capacity(outputs.len());
    for (template, path) in outputs {
        let content = templates::render(template, &ctx)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::Io)?;
        }
        std::fs::write(&path, content).map_err(Error::Io)?;
        written.push(path);
    }

    info!(project = %project.display(), files = written.len(), "Scaffolded demo project");
    Ok(written)
}

fn is_non_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
