//! Patcher - splice one method fragment into an existing facade
//!
//! Read-modify-write of the whole file. Not atomic: two processes patching
//! the same artifact can lose updates. One writer per generation root is
//! assumed.

use crate::error::{Error, Result};
use crate::locate::ArtifactIdentity;
use crate::render::{Fragment, CLOSING_SCOPE};
use tracing::warn;

/// How the insertion point was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionSource {
    /// Line recorded in a trusted manifest
    Manifest,
    /// Last line that is solely the closing scope marker
    Scan,
    /// No closing scope line; inserted before the last line
    Degraded,
}

/// Result of a successful patch
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// Line the fragment was inserted at
    pub insertion_line: usize,
    /// Where the next fragment would go
    pub next_insertion_line: usize,
    pub source: InsertionSource,
    /// Artifact text as written
    pub content: String,
}

/// Locate the insertion point in the artifact lines
///
/// A hint is used only when it still points at a closing scope line.
pub fn find_insertion_point(lines: &[&str], hint: Option<usize>) -> (usize, InsertionSource) {
    if let Some(line) = hint {
        if lines.get(line).map(|l| l.trim()) == Some(CLOSING_SCOPE) {
            return (line, InsertionSource::Manifest);
        }
    }

    match lines.iter().rposition(|l| l.trim() == CLOSING_SCOPE) {
        Some(line) => (line, InsertionSource::Scan),
        None => (lines.len().saturating_sub(1), InsertionSource::Degraded),
    }
}

/// Insert a fragment into artifact text
pub fn splice(content: &str, fragment: &Fragment, hint: Option<usize>) -> PatchOutcome {
    let mut lines: Vec<&str> = content.lines().collect();
    let (insertion_line, source) = find_insertion_point(&lines, hint);

    let tail = lines.split_off(insertion_line);
    let before = lines.len();
    lines.extend(fragment.text.lines());
    let inserted = lines.len() - before;
    lines.extend(tail);

    let mut content = lines.join("\n");
    content.push('\n');

    PatchOutcome {
        insertion_line,
        next_insertion_line: insertion_line + inserted,
        source,
        content,
    }
}

/// Append a method fragment to the artifact on disk
///
/// Fails only on IO. A degraded insertion point is logged, not refused.
pub fn patch(
    identity: &ArtifactIdentity,
    fragment: &Fragment,
    hint: Option<usize>,
) -> Result<PatchOutcome> {
    let path = &identity.path;
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Patch(format!("cannot read {}: {}", path.display(), e)))?;

    let outcome = splice(&content, fragment, hint);
    if outcome.source == InsertionSource::Degraded {
        warn!(
            artifact = %identity.simple_name,
            line = outcome.insertion_line,
            "No closing scope line found, inserting {} before the last line",
            fragment.name
        );
    }

    std::fs::write(path, &outcome.content)
        .map_err(|e| Error::Patch(format!("cannot write {}: {}", path.display(), e)))?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fragment(name: &str) -> Fragment {
        let text = format!("    public void {}() {{\n    }}\n\n", name);
        Fragment {
            name: name.into(),
            hash: crate::util::sha256_hex(&text),
            text,
        }
    }

    const BASE: &str = "public class DemoFacade {\n    public void a() {\n    }\n\n}\n";

    #[test]
    fn test_insert_before_closing_scope() {
        let outcome = splice(BASE, &fragment("b"), None);
        assert_eq!(outcome.source, InsertionSource::Scan);
        assert_eq!(outcome.insertion_line, 4);
        assert_eq!(outcome.next_insertion_line, 7);
        assert_eq!(
            outcome.content,
            "public class DemoFacade {\n    public void a() {\n    }\n\n    public void b() {\n    }\n\n}\n"
        );
    }

    #[test]
    fn test_trailing_lines_after_closing_scope() {
        let content = "public class DemoFacade {\n}\n// generated\n\n";
        let outcome = splice(content, &fragment("b"), None);
        assert_eq!(outcome.insertion_line, 1);
        assert_eq!(
            outcome.content,
            "public class DemoFacade {\n    public void b() {\n    }\n\n}\n// generated\n\n"
        );
    }

    #[test]
    fn test_degraded_insertion_before_last_line() {
        let content = "public class DemoFacade {\n    public void a() {\n    } // a\n} // end\n";
        let outcome = splice(content, &fragment("b"), None);

        assert_eq!(outcome.source, InsertionSource::Degraded);
        assert_eq!(outcome.insertion_line, 3);
        assert_eq!(
            outcome.content,
            "public class DemoFacade {\n    public void a() {\n    } // a\n    public void b() {\n    }\n\n} // end\n"
        );
    }

    #[test]
    fn test_empty_artifact_degrades_to_top() {
        let outcome = splice("", &fragment("b"), None);
        assert_eq!(outcome.source, InsertionSource::Degraded);
        assert_eq!(outcome.insertion_line, 0);
        assert_eq!(outcome.content, "    public void b() {\n    }\n\n");
    }

    #[test]
    fn test_hint_used_only_when_it_points_at_closing_scope() {
        let lines: Vec<&str> = BASE.lines().collect();
        assert_eq!(find_insertion_point(&lines, Some(4)), (4, InsertionSource::Manifest));
        assert_eq!(find_insertion_point(&lines, Some(1)), (4, InsertionSource::Scan));
        assert_eq!(find_insertion_point(&lines, Some(99)), (4, InsertionSource::Scan));
    }

    #[test]
    fn test_patch_file() {
        let temp = TempDir::new().unwrap();
        let identity = ArtifactIdentity {
            target_package: String::new(),
            simple_name: "DemoFacade".into(),
            path: temp.path().join("DemoFacade.java"),
        };
        std::fs::write(&identity.path, BASE).unwrap();

        let outcome = patch(&identity, &fragment("b"), None).unwrap();
        let written = std::fs::read_to_string(&identity.path).unwrap();
        assert_eq!(written, outcome.content);
        assert!(written.contains("public void b()"));
    }

    #[test]
    fn test_patch_missing_file_is_error() {
        let identity = ArtifactIdentity {
            target_package: String::new(),
            simple_name: "GoneFacade".into(),
            path: PathBuf::from("/nonexistent/facadegen/GoneFacade.java"),
        };
        let err = patch(&identity, &fragment("b"), None).unwrap_err();
        assert!(matches!(err, Error::Patch(_)));
    }
}
