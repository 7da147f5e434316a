//! Custom MiniJinja filters for code generation

use crate::util;
use minijinja::Environment;

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("package_path", package_path);
    env.add_filter("java_string", java_string);
}

/// `com.demo.mcp` -> `com/demo/mcp`
fn package_path(value: &str) -> String {
    value
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Make free text safe inside a Java string literal
fn java_string(value: &str) -> String {
    util::sanitize_description(value)
}
