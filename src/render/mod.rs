//! Facade rendering - turn declarations into Java source text
//!
//! A full artifact is the head template, one method fragment per declared
//! method, and a closing `}` line. The patch path renders the very same
//! fragment for a single method, so a facade grown by patches is
//! byte-identical to one emitted in a single pass.

use crate::config::{FacadeConfig, Wiring};
use crate::declaration::{MethodDeclaration, ServiceDeclaration};
use crate::error::{Error, Result};
use crate::locate::ArtifactIdentity;
use crate::templates::context::{HeadContext, MethodContext};
use crate::templates::{self, names};
use crate::util::{is_java_identifier, sha256_hex};

/// The line closing the facade type
pub const CLOSING_SCOPE: &str = "}";

/// Render configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub wiring: Wiring,
    pub extra_imports: Vec<String>,
    /// Date written into the header comment
    pub generated_on: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wiring: Wiring::Constructor,
            extra_imports: Vec::new(),
            generated_on: chrono::Local::now().date_naive().to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_config(config: &FacadeConfig) -> Self {
        Self {
            wiring: config.wiring,
            extra_imports: config.extra_imports.clone(),
            ..Self::default()
        }
    }

    /// Pin the header date, for reproducible output
    pub fn generated_on(mut self, date: impl Into<String>) -> Self {
        self.generated_on = date.into();
        self
    }
}

/// A rendered method block and its hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    pub text: String,
    pub hash: String,
}

impl Fragment {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Facade renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a complete artifact; every declared method gets a block
    pub fn render_artifact(
        &self,
        service: &ServiceDeclaration,
        identity: &ArtifactIdentity,
    ) -> Result<RenderedArtifact> {
        if service.simple_name.trim().is_empty() {
            return Err(Error::Render(format!(
                "service {} has no simple name",
                service.qualified_name
            )));
        }

        let head = HeadContext::new(
            service,
            identity,
            self.config.wiring == Wiring::Field,
            &self.config.extra_imports,
            &self.config.generated_on,
        );
        let mut text = templates::render(names::FACADE_HEAD, &head)?;

        let fragments = service
            .methods
            .iter()
            .map(|m| self.render_method(m))
            .collect::<Result<Vec<_>>>()?;
        for fragment in &fragments {
            text.push_str(&fragment.text);
        }
        text.push_str(CLOSING_SCOPE);
        text.push('\n');

        Ok(RenderedArtifact { text, fragments })
    }

    /// Render a single method block, including its trailing blank line
    pub fn render_method(&self, method: &MethodDeclaration) -> Result<Fragment> {
        if method.name.trim().is_empty() {
            return Err(Error::Render("method declaration without a name".into()));
        }
        if !is_java_identifier(&method.name) {
            return Err(Error::Render(format!(
                "method name '{}' is not a Java identifier",
                method.name
            )));
        }
        if let Some(p) = method.parameters.iter().find(|p| !is_java_identifier(&p.name)) {
            return Err(Error::Render(format!(
                "parameter '{}' of {} is not a Java identifier",
                p.name, method.name
            )));
        }
        let text = templates::render(names::FACADE_METHOD, &MethodContext::from_method(method))?;
        Ok(Fragment {
            name: method.name.clone(),
            hash: sha256_hex(&text),
            text,
        })
    }
}

/// Output of a full emission
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub text: String,
    pub fragments: Vec<Fragment>,
}

impl RenderedArtifact {
    /// 0-based line index of the closing scope line
    pub fn insertion_line(&self) -> usize {
        self.text.lines().count().saturating_sub(1)
    }
}
