//! Synthesis engine
//!
//! A [`Session`] owns everything that lives for one generation run: the
//! locator, the renderer, the member index cache and the set of
//! declarations already handled. Nothing is global; dropping the session
//! discards its caches.
//!
//! Per service declaration:
//!
//! 1. locate the artifact
//! 2. absent: emit the full artifact, done
//! 3. present: load the member index (once per session)
//! 4. patch in every method the index does not know, updating the index
//! 5. skip methods already present, without comparing their metadata
//!
//! Methods reported later on a known service enter at step 3, or at step 2
//! when the artifact is missing from disk.
//!
//! Failures stay local to the declaration or method they occur in. The
//! only error that escapes is a missing generation root.

use crate::config::FacadeConfig;
use crate::declaration::{DeclarationProvider, MethodDeclaration, Round, ServiceDeclaration};
use crate::error::{Error, Result};
use crate::index::{scan_members, MemberIndex};
use crate::locate::{ArtifactIdentity, Locator};
use crate::manifest::{ArtifactManifest, ManifestEntry};
use crate::patch::{self, PatchOutcome};
use crate::render::{Fragment, RenderConfig, Renderer};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What happened to one service declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceOutcome {
    /// New artifact written with every declared method
    Created {
        service: String,
        artifact: PathBuf,
        methods: usize,
    },
    /// Existing artifact received new methods (or tried to)
    Patched {
        service: String,
        artifact: PathBuf,
        added: Vec<String>,
        skipped: Vec<String>,
        failed: Vec<String>,
    },
    /// Existing artifact already had every method
    Unchanged { service: String, artifact: PathBuf },
    /// Declaration seen earlier in this session
    AlreadyProcessed { service: String },
    /// Declaration abandoned for this session
    Failed { service: String, error: String },
}

/// What happened to one method on an existing artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodOutcome {
    Added {
        service: String,
        method: String,
        line: usize,
    },
    /// Artifact was missing, so it was emitted whole from the known declaration
    Created {
        service: String,
        method: String,
        artifact: PathBuf,
    },
    /// Name already present in the artifact
    Skipped { service: String, method: String },
    Failed {
        service: String,
        method: String,
        error: String,
    },
    /// Method reported for a service this session has not seen
    UnknownService { service: String, method: String },
}

impl MethodOutcome {
    fn method(&self) -> &str {
        match self {
            MethodOutcome::Added { method, .. }
            | MethodOutcome::Created { method, .. }
            | MethodOutcome::Skipped { method, .. }
            | MethodOutcome::Failed { method, .. }
            | MethodOutcome::UnknownService { method, .. } => method,
        }
    }
}

/// Everything a session did
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub rounds: usize,
    pub services: Vec<ServiceOutcome>,
    /// Methods reported on already-known services
    pub methods: Vec<MethodOutcome>,
    /// Rounds the provider failed to produce
    pub provider_errors: Vec<String>,
}

impl SessionReport {
    pub fn created(&self) -> usize {
        self.services
            .iter()
            .filter(|o| matches!(o, ServiceOutcome::Created { .. }))
            .count()
    }

    /// Methods appended to existing artifacts, from either entry point
    pub fn added_methods(&self) -> usize {
        let from_services: usize = self
            .services
            .iter()
            .map(|o| match o {
                ServiceOutcome::Patched { added, .. } => added.len(),
                _ => 0,
            })
            .sum();
        let from_additions = self
            .methods
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    MethodOutcome::Added { .. } | MethodOutcome::Created { .. }
                )
            })
            .count();
        from_services + from_additions
    }

    /// Failed declarations, failed methods and provider errors
    pub fn failures(&self) -> usize {
        let services: usize = self
            .services
            .iter()
            .map(|o| match o {
                ServiceOutcome::Failed { .. } => 1,
                ServiceOutcome::Patched { failed, .. } => failed.len(),
                _ => 0,
            })
            .sum();
        let methods = self
            .methods
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    MethodOutcome::Failed { .. } | MethodOutcome::UnknownService { .. }
                )
            })
            .count();
        services + methods + self.provider_errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures() == 0
    }
}

/// Read-only comparison of declared methods against an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub service: String,
    pub artifact: PathBuf,
    pub exists: bool,
    /// Present and, as far as the manifest tells, current
    pub present: Vec<String>,
    /// Present, but rendered differently from what the manifest recorded
    pub stale: Vec<String>,
    /// Would be appended by the next generation run
    pub missing: Vec<String>,
}

impl ArtifactStatus {
    pub fn is_current(&self) -> bool {
        self.exists && self.stale.is_empty() && self.missing.is_empty()
    }
}

#[derive(Debug, Clone)]
struct KnownService {
    identity: ArtifactIdentity,
    declaration: ServiceDeclaration,
}

/// One generation session
#[derive(Debug)]
pub struct Session {
    locator: Locator,
    renderer: Renderer,
    manifest_enabled: bool,
    indexes: HashMap<PathBuf, MemberIndex>,
    processed: HashSet<String>,
    known: HashMap<String, KnownService>,
    report: SessionReport,
}

impl Session {
    /// Start a session writing under `root`
    ///
    /// A missing root is a configuration error; nothing can be generated.
    pub fn new(
        config: &FacadeConfig,
        root: Option<PathBuf>,
        render: RenderConfig,
    ) -> Result<Self> {
        let locator = Locator::new(root, config.extension.clone())?;
        debug!(root = %locator.root().display(), "Session started");
        Ok(Self {
            locator,
            renderer: Renderer::new(render),
            manifest_enabled: config.manifest,
            indexes: HashMap::new(),
            processed: HashSet::new(),
            known: HashMap::new(),
            report: SessionReport::default(),
        })
    }

    /// Start a session, resolving the root from flag, environment or config
    pub fn from_config(config: &FacadeConfig, explicit_root: Option<&Path>) -> Result<Self> {
        let root = config.resolve_root(explicit_root)?;
        Self::new(config, Some(root), RenderConfig::from_config(config))
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    pub fn into_report(self) -> SessionReport {
        self.report
    }

    /// Declaration of a service seen this session, including methods added since
    pub fn declaration(&self, service: &str) -> Option<&ServiceDeclaration> {
        self.known.get(service).map(|k| &k.declaration)
    }

    /// Drain a provider, processing every round in order
    pub fn run(&mut self, provider: &mut dyn DeclarationProvider) -> &SessionReport {
        loop {
            match provider.next_round() {
                Ok(Some(round)) => self.process_round(round),
                Ok(None) => break,
                Err(e) => {
                    error!("Declaration round abandoned: {}", e);
                    self.report.provider_errors.push(e.to_string());
                }
            }
        }
        info!(
            rounds = self.report.rounds,
            created = self.report.created(),
            added = self.report.added_methods(),
            failures = self.report.failures(),
            "Session finished"
        );
        &self.report
    }

    /// Process one discovery round
    pub fn process_round(&mut self, round: Round) {
        self.report.rounds += 1;
        debug!(
            round = self.report.rounds,
            services = round.services.len(),
            added_methods = round.added_methods.len(),
            "Processing round"
        );
        for service in &round.services {
            self.synthesize(service);
        }
        for addition in round.added_methods {
            self.add_method(&addition.service, addition.method);
        }
    }

    /// Create or extend the artifact for a service declaration
    pub fn synthesize(&mut self, service: &ServiceDeclaration) -> ServiceOutcome {
        let outcome = self.synthesize_inner(service);
        self.report.services.push(outcome.clone());
        outcome
    }

    fn synthesize_inner(&mut self, service: &ServiceDeclaration) -> ServiceOutcome {
        let name = service.qualified_name.clone();
        if !self.processed.insert(name.clone()) {
            debug!(service = %name, "Already processed in this session");
            return ServiceOutcome::AlreadyProcessed { service: name };
        }

        let identity = self.locator.locate(service);
        self.known.insert(
            name.clone(),
            KnownService {
                identity: identity.clone(),
                declaration: service.clone(),
            },
        );

        if !self.indexes.contains_key(&identity.path) && !identity.exists() {
            return match self.emit(service, &identity) {
                Ok(methods) => {
                    info!(
                        service = %name,
                        artifact = %identity.path.display(),
                        methods,
                        "Created facade"
                    );
                    ServiceOutcome::Created {
                        service: name,
                        artifact: identity.path,
                        methods,
                    }
                }
                Err(e) => {
                    error!(service = %name, "Facade not created: {}", e);
                    ServiceOutcome::Failed {
                        service: name,
                        error: e.to_string(),
                    }
                }
            };
        }

        let mut added = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        for method in &service.methods {
            match self.apply_method(&name, &identity, method) {
                MethodOutcome::Added { method, .. } => added.push(method),
                MethodOutcome::Skipped { method, .. } => skipped.push(method),
                other => failed.push(other.method().to_string()),
            }
        }

        if added.is_empty() && failed.is_empty() {
            debug!(service = %name, "Facade up to date");
            ServiceOutcome::Unchanged {
                service: name,
                artifact: identity.path,
            }
        } else {
            ServiceOutcome::Patched {
                service: name,
                artifact: identity.path,
                added,
                skipped,
                failed,
            }
        }
    }

    /// Add a method reported on an already-known service
    pub fn add_method(&mut self, service: &str, method: MethodDeclaration) -> MethodOutcome {
        let outcome = match self.known.get_mut(service) {
            Some(known) => {
                known.declaration.methods.push(method.clone());
                let identity = known.identity.clone();
                if !self.indexes.contains_key(&identity.path) && !identity.exists() {
                    let declaration = known.declaration.clone();
                    self.recreate(service, &declaration, &identity, &method)
                } else {
                    self.apply_method(service, &identity, &method)
                }
            }
            None => {
                warn!(
                    service,
                    method = %method.name,
                    "Method reported for unknown service, ignored"
                );
                MethodOutcome::UnknownService {
                    service: service.to_string(),
                    method: method.name,
                }
            }
        };
        self.report.methods.push(outcome.clone());
        outcome
    }

    /// Compare a declaration against its artifact without writing anything
    pub fn status(&self, service: &ServiceDeclaration) -> Result<ArtifactStatus> {
        let identity = self.locator.locate(service);
        let index = MemberIndex::load(&identity, self.manifest_enabled);

        let mut status = ArtifactStatus {
            service: service.qualified_name.clone(),
            exists: identity.exists(),
            artifact: identity.path.clone(),
            present: Vec::new(),
            stale: Vec::new(),
            missing: Vec::new(),
        };

        let mut seen = HashSet::new();
        for method in &service.methods {
            if !seen.insert(method.name.as_str()) {
                continue;
            }
            if !index.contains(&method.name) {
                status.missing.push(method.name.clone());
                continue;
            }
            let recorded = index
                .manifest()
                .and_then(|m| m.fragment_hash(&method.name))
                .filter(|hash| !hash.is_empty());
            let changed = match recorded {
                Some(hash) => hash != self.renderer.render_method(method)?.hash,
                None => false,
            };
            if changed {
                status.stale.push(method.name.clone());
            } else {
                status.present.push(method.name.clone());
            }
        }

        Ok(status)
    }

    fn emit(
        &mut self,
        service: &ServiceDeclaration,
        identity: &ArtifactIdentity,
    ) -> Result<usize> {
        let rendered = self.renderer.render_artifact(service, identity)?;
        if let Some(dir) = identity.path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::Io)?;
        }
        std::fs::write(&identity.path, &rendered.text).map_err(Error::Io)?;

        let manifest = self.manifest_enabled.then(|| {
            let manifest = ArtifactManifest::new(
                &service.qualified_name,
                identity,
                &rendered.text,
                rendered.insertion_line(),
                &rendered.fragments,
            );
            if let Err(e) = manifest.save(identity) {
                warn!(artifact = %identity.simple_name, "Manifest not written: {}", e);
            }
            manifest
        });

        let names = rendered.fragments.iter().map(|f| f.name.clone());
        self.indexes.insert(
            identity.path.clone(),
            MemberIndex::from_emission(names, manifest),
        );
        Ok(rendered.fragments.len())
    }

    /// Emit a whole artifact for a known service whose file is missing
    fn recreate(
        &mut self,
        service: &str,
        declaration: &ServiceDeclaration,
        identity: &ArtifactIdentity,
        method: &MethodDeclaration,
    ) -> MethodOutcome {
        match self.emit(declaration, identity) {
            Ok(methods) => {
                info!(
                    service,
                    method = %method.name,
                    artifact = %identity.path.display(),
                    methods,
                    "Artifact missing, created facade from known declaration"
                );
                MethodOutcome::Created {
                    service: service.to_string(),
                    method: method.name.clone(),
                    artifact: identity.path.clone(),
                }
            }
            Err(e) => {
                error!(service, method = %method.name, "Facade not created: {}", e);
                MethodOutcome::Failed {
                    service: service.to_string(),
                    method: method.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn apply_method(
        &mut self,
        service: &str,
        identity: &ArtifactIdentity,
        method: &MethodDeclaration,
    ) -> MethodOutcome {
        let manifest_enabled = self.manifest_enabled;
        let index = self
            .indexes
            .entry(identity.path.clone())
            .or_insert_with(|| MemberIndex::load(identity, manifest_enabled));

        if index.contains(&method.name) {
            debug!(service, method = %method.name, "Method already present");
            return MethodOutcome::Skipped {
                service: service.to_string(),
                method: method.name.clone(),
            };
        }

        let result = self
            .renderer
            .render_method(method)
            .and_then(|fragment| {
                patch::patch(identity, &fragment, index.insertion_hint()).map(|o| (fragment, o))
            });

        match result {
            Ok((fragment, outcome)) => {
                index.insert(method.name.clone());
                if manifest_enabled {
                    record_patch(index, service, identity, &fragment, &outcome);
                }
                info!(
                    service,
                    method = %method.name,
                    artifact = %identity.path.display(),
                    line = outcome.insertion_line,
                    "Added method to facade"
                );
                MethodOutcome::Added {
                    service: service.to_string(),
                    method: method.name.clone(),
                    line: outcome.insertion_line,
                }
            }
            Err(e) => {
                error!(service, method = %method.name, "Method not added: {}", e);
                MethodOutcome::Failed {
                    service: service.to_string(),
                    method: method.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Bring the manifest in line with a freshly patched artifact
///
/// Without a trusted manifest the member list is rebuilt from the text:
/// entries the scan no longer finds are dropped, and methods the manifest
/// never recorded are adopted with an empty hash.
fn record_patch(
    index: &mut MemberIndex,
    service: &str,
    identity: &ArtifactIdentity,
    fragment: &Fragment,
    outcome: &PatchOutcome,
) {
    let trusted = index.manifest_trusted();
    let mut manifest = index
        .take_manifest()
        .unwrap_or_else(|| ArtifactManifest::new(service, identity, "", 0, &[]));
    if !trusted {
        let found: Vec<String> = scan_members(&outcome.content)
            .into_iter()
            .filter(|name| *name != fragment.name && *name != identity.simple_name)
            .collect();
        manifest.methods.retain(|e| found.contains(&e.name));
        for name in found {
            if manifest.fragment_hash(&name).is_none() {
                manifest.methods.push(ManifestEntry {
                    name,
                    fragment_hash: String::new(),
                });
            }
        }
    }
    manifest.record_patch(fragment, &outcome.content, outcome.next_insertion_line);

    if let Err(e) = manifest.save(identity) {
        warn!(artifact = %identity.simple_name, "Manifest not written: {}", e);
    }
    index.set_manifest(manifest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{MethodAddition, StaticProvider};
    use crate::index::IndexSource;
    use tempfile::TempDir;

    fn session(root: &Path) -> Session {
        Session::new(
            &FacadeConfig::default(),
            Some(root.to_path_buf()),
            RenderConfig::default().generated_on("2024-03-19"),
        )
        .unwrap()
    }

    fn calc(methods: &[&str]) -> ServiceDeclaration {
        methods.iter().fold(ServiceDeclaration::new("demo.Calc"), |s, m| {
            s.with_method(MethodDeclaration::new(*m, "int").param("x", "int"))
        })
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err =
            Session::new(&FacadeConfig::default(), None, RenderConfig::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_create_then_unchanged() {
        let temp = TempDir::new().unwrap();
        let outcome = session(temp.path()).synthesize(&calc(&["a", "b"]));
        assert!(matches!(outcome, ServiceOutcome::Created { methods: 2, .. }));

        let outcome = session(temp.path()).synthesize(&calc(&["a", "b"]));
        assert!(matches!(outcome, ServiceOutcome::Unchanged { .. }));
    }

    #[test]
    fn test_same_declaration_twice_in_one_session() {
        let temp = TempDir::new().unwrap();
        let mut session = session(temp.path());
        session.synthesize(&calc(&["a"]));
        let second = session.synthesize(&calc(&["a", "b"]));
        assert_eq!(
            second,
            ServiceOutcome::AlreadyProcessed {
                service: "demo.Calc".into()
            }
        );
    }

    #[test]
    fn test_patch_uses_cached_index() {
        let temp = TempDir::new().unwrap();
        session(temp.path()).synthesize(&calc(&["a"]));

        let mut session = session(temp.path());
        let outcome = session.synthesize(&calc(&["a", "b"]));
        match outcome {
            ServiceOutcome::Patched { added, skipped, failed, .. } => {
                assert_eq!(added, vec!["b"]);
                assert_eq!(skipped, vec!["a"]);
                assert!(failed.is_empty());
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let path = session.locator().locate(&calc(&[])).path;
        let index = &session.indexes[&path];
        assert!(index.contains("b"));
        assert!(index.manifest_trusted());
        assert_eq!(index.source(), IndexSource::Manifest);
    }

    #[test]
    fn test_add_method_to_known_service() {
        let temp = TempDir::new().unwrap();
        let mut session = session(temp.path());
        session.synthesize(&calc(&["a"]));

        let outcome = session.add_method("demo.Calc", MethodDeclaration::new("b", "void"));
        assert!(matches!(outcome, MethodOutcome::Added { .. }));

        let again = session.add_method("demo.Calc", MethodDeclaration::new("b", "void"));
        assert!(matches!(again, MethodOutcome::Skipped { .. }));

        let known = session.declaration("demo.Calc").unwrap();
        assert_eq!(known.methods.len(), 3);
    }

    #[test]
    fn test_add_method_to_unknown_service() {
        let temp = TempDir::new().unwrap();
        let mut session = session(temp.path());
        let outcome = session.add_method("demo.Nope", MethodDeclaration::new("b", "void"));
        assert!(matches!(outcome, MethodOutcome::UnknownService { .. }));
        assert_eq!(session.report().failures(), 1);
    }

    #[test]
    fn test_run_drains_rounds() {
        let temp = TempDir::new().unwrap();
        let mut provider = StaticProvider::new([
            Round {
                services: vec![calc(&["a"])],
                added_methods: Vec::new(),
            },
            Round {
                services: Vec::new(),
                added_methods: vec![MethodAddition {
                    service: "demo.Calc".into(),
                    method: MethodDeclaration::new("b", "int"),
                }],
            },
        ]);

        let mut session = session(temp.path());
        let report = session.run(&mut provider);
        assert_eq!(report.rounds, 2);
        assert_eq!(report.created(), 1);
        assert_eq!(report.added_methods(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_render_failure_abandons_declaration() {
        let temp = TempDir::new().unwrap();
        let mut broken = calc(&["a"]);
        broken.simple_name.clear();
        let outcome = session(temp.path()).synthesize(&broken);
        assert!(matches!(outcome, ServiceOutcome::Failed { .. }));
    }

    #[test]
    fn test_status_reports_stale_and_missing() {
        let temp = TempDir::new().unwrap();
        session(temp.path()).synthesize(&calc(&["a", "b"]));

        let changed = ServiceDeclaration::new("demo.Calc")
            .with_method(MethodDeclaration::new("a", "int").param("x", "int"))
            .with_method(MethodDeclaration::new("b", "long").param("x", "int"))
            .with_method(MethodDeclaration::new("c", "int"));

        let status = session(temp.path()).status(&changed).unwrap();
        assert!(status.exists);
        assert_eq!(status.present, vec!["a"]);
        assert_eq!(status.stale, vec!["b"]);
        assert_eq!(status.missing, vec!["c"]);
        assert!(!status.is_current());
    }
}
