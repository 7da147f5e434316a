//! Template-based text generation
//!
//! Uses MiniJinja templates embedded in the binary. Facade templates are
//! rendered with block trimming so that the emitted Java has a fixed,
//! line-exact layout the member index and patcher can rely on.

pub mod context;
pub mod filters;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::Result;

// Embedded templates (compiled into binary)
mod embedded {
    // Facade templates
    pub const FACADE_HEAD: &str = include_str!("../../templates/facade/head.jinja");
    pub const FACADE_METHOD: &str = include_str!("../../templates/facade/method.jinja");

    // Scaffold templates
    pub const POM: &str = include_str!("../../templates/scaffold/pom.xml.jinja");
    pub const README: &str = include_str!("../../templates/scaffold/README.md.jinja");
    pub const APPLICATION: &str =
        include_str!("../../templates/scaffold/McpDemoApplication.java.jinja");
    pub const SERVER_CONFIG: &str =
        include_str!("../../templates/scaffold/McpServerConfig.java.jinja");
    pub const WEATHER_SERVICE: &str =
        include_str!("../../templates/scaffold/WeatherService.java.jinja");
    pub const CLIENT_TEST: &str = include_str!("../../templates/scaffold/ClientSseTest.java.jinja");
    pub const PROPERTIES: &str =
        include_str!("../../templates/scaffold/application.properties.jinja");
    pub const FACADEGEN_YAML: &str = include_str!("../../templates/scaffold/facadegen.yaml.jinja");
}

/// Template names
pub mod names {
    pub const FACADE_HEAD: &str = "facade/head.jinja";
    pub const FACADE_METHOD: &str = "facade/method.jinja";

    pub const POM: &str = "scaffold/pom.xml.jinja";
    pub const README: &str = "scaffold/README.md.jinja";
    pub const APPLICATION: &str = "scaffold/McpDemoApplication.java.jinja";
    pub const SERVER_CONFIG: &str = "scaffold/McpServerConfig.java.jinja";
    pub const WEATHER_SERVICE: &str = "scaffold/WeatherService.java.jinja";
    pub const CLIENT_TEST: &str = "scaffold/ClientSseTest.java.jinja";
    pub const PROPERTIES: &str = "scaffold/application.properties.jinja";
    pub const FACADEGEN_YAML: &str = "scaffold/facadegen.yaml.jinja";
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

/// Initialize the template engine with embedded templates
fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();

    // Emitted text is source code, never HTML
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    filters::register_filters(&mut env);

    for (name, source) in [
        (names::FACADE_HEAD, embedded::FACADE_HEAD),
        (names::FACADE_METHOD, embedded::FACADE_METHOD),
        (names::POM, embedded::POM),
        (names::README, embedded::README),
        (names::APPLICATION, embedded::APPLICATION),
        (names::SERVER_CONFIG, embedded::SERVER_CONFIG),
        (names::WEATHER_SERVICE, embedded::WEATHER_SERVICE),
        (names::CLIENT_TEST, embedded::CLIENT_TEST),
        (names::PROPERTIES, embedded::PROPERTIES),
        (names::FACADEGEN_YAML, embedded::FACADEGEN_YAML),
    ] {
        env.add_template(name, source)
            .unwrap_or_else(|e| panic!("Failed to load embedded template {}: {}", name, e));
    }

    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Render an embedded template with a serializable context
pub fn render<S: Serialize>(name: &str, ctx: &S) -> Result<String> {
    let template = engine().get_template(name)?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_engine_initialization() {
        let env = engine();
        assert!(env.get_template(names::FACADE_HEAD).is_ok());
        assert!(env.get_template(names::FACADE_METHOD).is_ok());
        assert!(env.get_template(names::POM).is_ok());
        assert!(env.get_template(names::FACADEGEN_YAML).is_ok());
    }

    #[test]
    fn test_block_tags_leave_no_blank_lines() {
        let code = render(
            names::FACADE_METHOD,
            &context! {
                description => "Ping",
                return_type => "void",
                name => "ping",
                parameters => "",
                arguments => "",
                returns_value => false,
            },
        )
        .unwrap();

        assert_eq!(
            code,
            "    @Tool(description = \"Ping\")\n\
             \x20   public void ping() {\n\
             \x20       try {\n\
             \x20           service.ping();\n\
             \x20       } catch (Exception e) {\n\
             \x20           throw new RuntimeException(e.getMessage(), e);\n\
             \x20       }\n\
             \x20   }\n\n"
        );
    }

    #[test]
    fn test_no_html_escaping() {
        let pom = render(
            names::POM,
            &context! {
                group_id => "com.demo",
                artifact_id => "a&b",
                version => "1.0.0",
                framework_version => "3.4.0",
                library_version => "1.0.0-M6",
                annotations_version => "1.0.1",
            },
        )
        .unwrap();
        assert!(pom.contains("<artifactId>a&b</artifactId>"));
        assert!(pom.contains("${spring-ai.version}"));
    }
}
