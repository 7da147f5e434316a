//! Java source parser - finds annotated service classes
//!
//! A class carrying `@MCPService` becomes a [`ServiceDeclaration`]; its
//! public methods become [`MethodDeclaration`]s. Nested classes are
//! visited too and get a dotted qualified name.

use crate::declaration::{MethodDeclaration, Parameter, ServiceDeclaration};
use crate::error::{Error, Result};
use tree_sitter::{Node, Parser};

/// Marks a class whose public methods get a facade
pub const SERVICE_ANNOTATION: &str = "MCPService";

/// Optional per-method description override
pub const METHOD_ANNOTATION: &str = "MCPMethod";

/// Parse Java source and return the annotated services it declares
pub fn parse_java(source: &str) -> Result<Vec<ServiceDeclaration>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| Error::CodeParse(format!("Failed to set language: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::CodeParse("Failed to parse source".into()))?;

    let root = tree.root_node();
    let package = package_name(root, source).unwrap_or_default();

    let mut services = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "class_declaration" {
            collect_classes(child, source, &package, &package, &mut services);
        }
    }
    Ok(services)
}

fn package_name(root: Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    let decl = root
        .children(&mut cursor)
        .find(|c| c.kind() == "package_declaration")?;

    let mut inner = decl.walk();
    let name = decl
        .children(&mut inner)
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))?;
    Some(text(name, source).to_string())
}

fn collect_classes(
    node: Node,
    source: &str,
    package: &str,
    outer: &str,
    services: &mut Vec<ServiceDeclaration>,
) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let qualified = if outer.is_empty() {
        text(name, source).to_string()
    } else {
        format!("{}.{}", outer, text(name, source))
    };

    if let Some(annotation) = find_annotation(node, source, SERVICE_ANNOTATION) {
        let mut service = ServiceDeclaration::new(&qualified);
        service.declared_package = package.to_string();
        if let Some(pkg) = annotation_value(annotation, source, "packageName") {
            if !pkg.trim().is_empty() {
                service = service.with_override_package(pkg);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() == "method_declaration" && is_public(member, source) {
                    if let Some(method) = parse_method(member, source) {
                        service.methods.push(method);
                    }
                }
            }
        }
        services.push(service);
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            if member.kind() == "class_declaration" {
                collect_classes(member, source, package, &qualified, services);
            }
        }
    }
}

fn parse_method(node: Node, source: &str) -> Option<MethodDeclaration> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let return_type = node
        .child_by_field_name("type")
        .map(|t| text(t, source).to_string())
        .unwrap_or_else(|| "void".to_string());
    // `<T> List<T>`: the facade method stays generic
    let return_type = match type_parameters(node) {
        Some(params) => format!("{} {}", text(params, source), return_type),
        None => return_type,
    };

    let mut method = MethodDeclaration::new(name, return_type);
    if let Some(params) = node.child_by_field_name("parameters") {
        method.parameters = parse_parameters(params, source);
    }

    method.description = find_annotation(node, source, METHOD_ANNOTATION)
        .and_then(|a| annotation_value(a, source, "description"))
        .filter(|d| !d.trim().is_empty())
        .or_else(|| javadoc(node, source));

    Some(method)
}

fn parse_parameters(node: Node, source: &str) -> Vec<Parameter> {
    let mut params = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "formal_parameter" => {
                let name = child.child_by_field_name("name");
                let typ = child.child_by_field_name("type");
                if let (Some(name), Some(typ)) = (name, typ) {
                    let dims = child
                        .child_by_field_name("dimensions")
                        .map(|d| text(d, source))
                        .unwrap_or("");
                    params.push(Parameter {
                        name: text(name, source).to_string(),
                        typ: format!("{}{}", text(typ, source), dims),
                    });
                }
            }
            // `String... args`
            "spread_parameter" => {
                let mut typ = String::new();
                let mut name = String::new();
                let mut inner = child.walk();
                for part in child.children(&mut inner) {
                    match part.kind() {
                        "variable_declarator" => {
                            if let Some(n) = part.child_by_field_name("name") {
                                name = text(n, source).to_string();
                            }
                        }
                        "modifiers" | "..." => {}
                        _ if typ.is_empty() => typ = text(part, source).to_string(),
                        _ => {}
                    }
                }
                if !name.is_empty() {
                    params.push(Parameter {
                        name,
                        typ: format!("{}...", typ),
                    });
                }
            }
            _ => {}
        }
    }

    params
}

fn type_parameters(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|c| c.kind() == "type_parameters");
    found
}

fn modifiers(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == "modifiers");
    found
}

fn is_public(node: Node, source: &str) -> bool {
    let Some(mods) = modifiers(node) else {
        return false;
    };
    let mut cursor = mods.walk();
    let public = mods
        .children(&mut cursor)
        .any(|c| text(c, source) == "public");
    public
}

/// Annotation on a class or method, matched by simple name
fn find_annotation<'a>(node: Node<'a>, source: &str, wanted: &str) -> Option<Node<'a>> {
    let mods = modifiers(node)?;
    let mut cursor = mods.walk();
    let found = mods.children(&mut cursor).find(|c| {
        matches!(c.kind(), "annotation" | "marker_annotation")
            && c.child_by_field_name("name")
                .map(|n| simple_name(text(n, source)) == wanted)
                .unwrap_or(false)
    });
    found
}

/// String value of `key = "..."` in an annotation
fn annotation_value(annotation: Node, source: &str, key: &str) -> Option<String> {
    let args = annotation.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let pair = args.named_children(&mut cursor).find(|arg| {
        arg.kind() == "element_value_pair"
            && arg
                .child_by_field_name("key")
                .is_some_and(|k| text(k, source) == key)
    })?;
    pair.child_by_field_name("value")
        .map(|v| string_value(v, source))
}

/// Concatenated contents of the string literals in an expression
fn string_value(node: Node, source: &str) -> String {
    if node.kind() == "string_literal" {
        let raw = text(node, source);
        let inner = raw
            .strip_prefix("\"\"\"")
            .and_then(|s| s.strip_suffix("\"\"\""))
            .or_else(|| raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
            .unwrap_or(raw);
        return unescape(inner);
    }

    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        out.push_str(&string_value(child, source));
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Body of the Javadoc comment right before a method, up to the first block tag
fn javadoc(node: Node, source: &str) -> Option<String> {
    let comment = node.prev_sibling()?;
    if comment.kind() != "block_comment" {
        return None;
    }
    let raw = text(comment, source);
    let body = raw.strip_prefix("/**")?.strip_suffix("*/")?;

    let mut lines = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        if line.starts_with('@') {
            break;
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    let joined = lines.join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEATHER: &str = r#"
package com.demo.service;

import com.unionhole.mcp.annotation.MCPService;

@Service
@MCPService(packageName = "com.demo.mcp")
public class WeatherService {

    /**
     * Get weather information for a specific city
     *
     * @param cityName name of the city
     * @return a short report
     */
    public String getWeather(String cityName) {
        return "Sunny in " + cityName;
    }

    @MCPMethod(description = "Air quality " + "index")
    public int airQuality(String cityName, int[] days) {
        return 42;
    }

    public void refresh(String... cities) {
    }

    private void helper() {
    }

    String packagePrivate() {
        return "";
    }
}
"#;

    #[test]
    fn test_parse_annotated_service() {
        let services = parse_java(WEATHER).unwrap();
        assert_eq!(services.len(), 1);

        let service = &services[0];
        assert_eq!(service.qualified_name, "com.demo.service.WeatherService");
        assert_eq!(service.simple_name, "WeatherService");
        assert_eq!(service.declared_package, "com.demo.service");
        assert_eq!(service.override_package.as_deref(), Some("com.demo.mcp"));

        let names: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["getWeather", "airQuality", "refresh"]);
    }

    #[test]
    fn test_method_details() {
        let services = parse_java(WEATHER).unwrap();
        let methods = &services[0].methods;

        assert_eq!(methods[0].return_type, "String");
        assert_eq!(methods[0].parameters[0].name, "cityName");
        assert_eq!(methods[0].parameters[0].typ, "String");
        assert_eq!(
            methods[0].description.as_deref(),
            Some("Get weather information for a specific city")
        );

        assert_eq!(methods[1].description.as_deref(), Some("Air quality index"));
        assert_eq!(methods[1].parameters[1].typ, "int[]");

        assert_eq!(methods[2].return_type, "void");
        assert_eq!(methods[2].parameters[0].typ, "String...");
        assert_eq!(methods[2].description, None);
    }

    #[test]
    fn test_unannotated_class_ignored() {
        let source = "package a;\npublic class Plain {\n    public void x() {}\n}\n";
        assert!(parse_java(source).unwrap().is_empty());
    }

    #[test]
    fn test_marker_annotation_and_default_package() {
        let source = "@MCPService\npublic class Calc {\n    \
                      public int add(int a, int b) { return a + b; }\n}\n";
        let services = parse_java(source).unwrap();
        assert_eq!(services[0].qualified_name, "Calc");
        assert_eq!(services[0].declared_package, "");
        assert_eq!(services[0].override_package, None);
        assert_eq!(services[0].methods[0].parameters.len(), 2);
    }

    #[test]
    fn test_generic_method_keeps_type_parameters() {
        let source = r#"@MCPService
public class Box {
    public <T> java.util.List<T> wrap(T value) { return null; }
    public <T extends Comparable<T>> void sort(T[] items) {}
}
"#;
        let services = parse_java(source).unwrap();
        let methods = &services[0].methods;
        assert_eq!(methods[0].return_type, "<T> java.util.List<T>");
        assert_eq!(methods[0].parameters[0].typ, "T");
        assert_eq!(methods[1].return_type, "<T extends Comparable<T>> void");
        assert_eq!(methods[1].parameters[0].typ, "T[]");
    }

    #[test]
    fn test_nested_service() {
        let source = r#"package a;
public class Outer {
    @MCPService
    public static class Inner {
        public void ping() {}
    }
}
"#;
        let services = parse_java(source).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].qualified_name, "a.Outer.Inner");
        assert_eq!(services[0].simple_name, "Inner");
        assert_eq!(services[0].declared_package, "a");
    }
}
