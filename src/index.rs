//! Member index - which methods a facade already contains
//!
//! Rebuilt the first time an artifact is touched in a session. A trusted
//! manifest answers directly; otherwise the artifact text is scanned line
//! by line. The scan is deliberately shallow:
//!
//! - a line counts when, trimmed, it starts with `public` and contains `(`
//! - the method name is the token right before the first `(`
//! - no brace tracking, so multi-line signatures are missed and
//!   constructors are picked up as members
//!
//! Detection is by name only. An overload of a generated method is
//! treated as already present.

use crate::locate::ArtifactIdentity;
use crate::manifest::ArtifactManifest;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Visibility marker that opens a method signature line
pub const VISIBILITY: &str = "public";

/// Where the member set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// No artifact on disk yet
    Absent,
    /// Manifest whose content hash matches the artifact
    Manifest,
    /// Textual scan of the artifact
    TextScan,
    /// Artifact exists but could not be read; treated as empty
    Unreadable,
}

/// Known members of one artifact
#[derive(Debug, Clone)]
pub struct MemberIndex {
    members: HashSet<String>,
    source: IndexSource,
    manifest: Option<ArtifactManifest>,
    manifest_trusted: bool,
}

impl MemberIndex {
    /// Index of an artifact that does not exist yet
    pub fn empty() -> Self {
        Self {
            members: HashSet::new(),
            source: IndexSource::Absent,
            manifest: None,
            manifest_trusted: false,
        }
    }

    /// Index for an artifact the engine has just written
    pub fn from_emission(
        names: impl IntoIterator<Item = String>,
        manifest: Option<ArtifactManifest>,
    ) -> Self {
        Self {
            members: names.into_iter().collect(),
            source: IndexSource::Manifest,
            manifest_trusted: manifest.is_some(),
            manifest,
        }
    }

    /// Load the index of an artifact from disk
    ///
    /// Never fails: an unreadable artifact yields an empty index.
    pub fn load(identity: &ArtifactIdentity, use_manifest: bool) -> Self {
        if !identity.exists() {
            return Self::empty();
        }

        let content = match std::fs::read_to_string(&identity.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    artifact = %identity.path.display(),
                    "Cannot read artifact, assuming no known members: {}", e
                );
                return Self {
                    source: IndexSource::Unreadable,
                    ..Self::empty()
                };
            }
        };

        let manifest = if use_manifest {
            match ArtifactManifest::load(identity) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(artifact = %identity.simple_name, "Ignoring manifest: {}", e);
                    None
                }
            }
        } else {
            None
        };

        match manifest {
            Some(m) if m.matches(&content) => {
                debug!(
                    artifact = %identity.simple_name,
                    methods = m.methods.len(),
                    "Member index from manifest"
                );
                Self {
                    members: m.methods.iter().map(|e| e.name.clone()).collect(),
                    source: IndexSource::Manifest,
                    manifest: Some(m),
                    manifest_trusted: true,
                }
            }
            other => {
                if other.is_some() {
                    debug!(
                        artifact = %identity.simple_name,
                        "Manifest out of date, scanning artifact text"
                    );
                }
                let members: HashSet<String> = scan_members(&content).into_iter().collect();
                debug!(
                    artifact = %identity.simple_name,
                    methods = members.len(),
                    "Member index from text scan"
                );
                Self {
                    members,
                    source: IndexSource::TextScan,
                    manifest: other,
                    manifest_trusted: false,
                }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// Record a method appended during this session
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.members.insert(name.into())
    }

    /// Known member names, sorted
    pub fn members(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn source(&self) -> IndexSource {
        self.source
    }

    /// Manifest, trusted or not
    pub fn manifest(&self) -> Option<&ArtifactManifest> {
        self.manifest.as_ref()
    }

    /// Whether the manifest describes the artifact as it is on disk
    pub fn manifest_trusted(&self) -> bool {
        self.manifest_trusted
    }

    /// Insertion line recorded by a trusted manifest
    pub fn insertion_hint(&self) -> Option<usize> {
        self.manifest
            .as_ref()
            .filter(|_| self.manifest_trusted)
            .map(|m| m.insertion_line)
    }

    /// Hand the manifest to the caller for updating
    pub fn take_manifest(&mut self) -> Option<ArtifactManifest> {
        self.manifest_trusted = false;
        self.manifest.take()
    }

    /// Store a manifest that matches the artifact just written
    pub fn set_manifest(&mut self, manifest: ArtifactManifest) {
        self.manifest = Some(manifest);
        self.manifest_trusted = true;
    }
}

/// Method names found in artifact text, in file order, without duplicates
pub fn scan_members(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(method_name)
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Name of the method declared on this line, if it looks like a signature
pub fn method_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix(VISIBILITY)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let paren = rest.find('(')?;
    rest[..paren]
        .split_whitespace()
        .last()
        .filter(|token| *token != VISIBILITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[rstest]
    #[case("    public String getWeather(String cityName) {", Some("getWeather"))]
    #[case("\tpublic void tabbed() {", Some("tabbed"))]
    #[case("    public static <T> List<T> wrap(T value) {", Some("wrap"))]
    #[case("    public Map<String, Integer> counts(", Some("counts"))]
    #[case("    public WeatherFacade(Weather service) {", Some("WeatherFacade"))]
    #[case("public class WeatherFacade {", None)]
    #[case("    public Map<String, Integer>", None)]
    #[case("    private String helper(int x) {", None)]
    #[case("    protected void hidden() {", None)]
    #[case("    @Tool(description = \"public thing()\")", None)]
    #[case("    publicity(x);", None)]
    #[case("", None)]
    fn test_method_name(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(method_name(line), expected);
    }

    #[test]
    fn test_scan_members_keeps_order_and_dedups() {
        let content = "\
public class DemoFacade {
    public DemoFacade(Demo service) {
    }
    public int add(int a) {
    }
    public int add(int a, int b) {
    }
    public String
        split(String s) {
    }
}
";
        assert_eq!(scan_members(content), vec!["DemoFacade", "add"]);
    }

    fn identity(dir: &Path) -> ArtifactIdentity {
        ArtifactIdentity {
            target_package: String::new(),
            simple_name: "DemoFacade".into(),
            path: dir.join("DemoFacade.java"),
        }
    }

    #[test]
    fn test_load_absent() {
        let temp = TempDir::new().unwrap();
        let index = MemberIndex::load(&identity(temp.path()), true);
        assert_eq!(index.source(), IndexSource::Absent);
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_text_scan_without_manifest() {
        let temp = TempDir::new().unwrap();
        let id = identity(temp.path());
        std::fs::write(
            &id.path,
            "public class DemoFacade {\n    public void a() {\n    }\n}\n",
        )
        .unwrap();

        let index = MemberIndex::load(&id, true);
        assert_eq!(index.source(), IndexSource::TextScan);
        assert!(index.contains("a"));
        assert_eq!(index.insertion_hint(), None);
    }

    #[test]
    fn test_unreadable_artifact_is_empty() {
        let temp = TempDir::new().unwrap();
        let id = identity(temp.path());
        std::fs::write(&id.path, b"\xff\xfe public void a() {\n}\n").unwrap();

        let index = MemberIndex::load(&id, true);
        assert_eq!(index.source(), IndexSource::Unreadable);
        assert!(index.is_empty());
        assert_eq!(index.insertion_hint(), None);
    }

    #[test]
    fn test_directory_counts_as_absent() {
        let temp = TempDir::new().unwrap();
        let id = ArtifactIdentity {
            target_package: String::new(),
            simple_name: "DirFacade".into(),
            path: PathBuf::from(temp.path()),
        };
        assert_eq!(MemberIndex::load(&id, false).source(), IndexSource::Absent);
    }

    #[test]
    fn test_insert_updates_cache() {
        let mut index = MemberIndex::empty();
        assert!(index.insert("a"));
        assert!(!index.insert("a"));
        assert!(index.insert("b"));
        assert_eq!(index.members(), vec!["a", "b"]);
        assert_eq!(index.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_single_line_signature_is_detected(
            name in "[a-z][a-zA-Z0-9_]{0,15}",
            ret in prop::sample::select(vec![
                "void",
                "String",
                "int",
                "List<String>",
                "Map<String, Object>",
            ]),
            indent in "[ \t]{0,8}",
        ) {
            let line = format!("{}public {} {}(String arg) {{", indent, ret, name);
            prop_assert_eq!(method_name(&line), Some(name.as_str()));
        }

        #[test]
        fn prop_non_public_lines_are_ignored(
            name in "[a-z][a-zA-Z0-9_]{0,15}",
            vis in prop::sample::select(vec!["private", "protected", "static", ""]),
        ) {
            let line = format!("    {} void {}() {{", vis, name);
            prop_assert_eq!(method_name(&line), None);
        }
    }
}
