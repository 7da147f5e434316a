//! Shared utility functions
//!
//! Small helpers used by the locator, emitter, manifest and providers.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Convert a dotted package name into a relative directory path
///
/// # Examples
/// ```
/// use facadegen::util::package_to_path;
/// use std::path::PathBuf;
/// assert_eq!(package_to_path("com.demo.mcp"), PathBuf::from("com/demo/mcp"));
/// assert_eq!(package_to_path(""), PathBuf::new());
/// ```
pub fn package_to_path(package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Split a qualified name into `(package, simple_name)`
///
/// # Examples
/// ```
/// use facadegen::util::split_qualified_name;
/// assert_eq!(split_qualified_name("com.demo.Weather"), ("com.demo", "Weather"));
/// assert_eq!(split_qualified_name("Weather"), ("", "Weather"));
/// ```
pub fn split_qualified_name(qualified: &str) -> (&str, &str) {
    match qualified.rfind('.') {
        Some(idx) => (&qualified[..idx], &qualified[idx + 1..]),
        None => ("", qualified),
    }
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Failed to compile whitespace pattern"))
}

fn java_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Failed to compile identifier pattern")
    })
}

/// Whether a name can stand as a Java method or parameter name
///
/// # Examples
/// ```
/// use facadegen::util::is_java_identifier;
/// assert!(is_java_identifier("getWeather"));
/// assert!(!is_java_identifier("get weather"));
/// ```
pub fn is_java_identifier(name: &str) -> bool {
    java_identifier().is_match(name)
}

/// Normalise free text so it can sit inside a Java string literal
///
/// Whitespace runs collapse to a single space, double quotes become single
/// quotes and backslashes are escaped.
///
/// # Examples
/// ```
/// use facadegen::util::sanitize_description;
/// assert_eq!(
///     sanitize_description("  Get the \"current\"\n   weather "),
///     "Get the 'current' weather"
/// );
/// ```
pub fn sanitize_description(text: &str) -> String {
    whitespace_run()
        .replace_all(text.trim(), " ")
        .replace('\\', "\\\\")
        .replace('"', "'")
}

/// SHA-256 of a text, hex encoded
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
