//! Template context structures
//!
//! Converts declarations into template-friendly data structures.

use crate::declaration::{MethodDeclaration, ServiceDeclaration};
use crate::locate::ArtifactIdentity;
use crate::util::sanitize_description;
use serde::Serialize;

/// Fixed imports of every facade
pub const TOOL_IMPORT: &str = "org.springframework.ai.tool.annotation.Tool";
pub const SERVICE_IMPORT: &str = "org.springframework.stereotype.Service";
pub const AUTOWIRED_IMPORT: &str = "org.springframework.beans.factory.annotation.Autowired";

/// Context for the artifact head (everything before the first method)
#[derive(Debug, Clone, Serialize)]
pub struct HeadContext {
    /// Target package, empty for the default package
    pub package: String,
    /// Import lines, in emission order
    pub imports: Vec<String>,
    /// Service simple name
    pub service: String,
    /// Facade simple name
    pub facade: String,
    /// `@Autowired` field instead of a constructor
    pub field_injection: bool,
    /// Tool version for the header comment
    pub version: String,
    /// Date for the `@since` tag
    pub generated_on: String,
}

impl HeadContext {
    pub fn new(
        service: &ServiceDeclaration,
        identity: &ArtifactIdentity,
        field_injection: bool,
        extra_imports: &[String],
        generated_on: &str,
    ) -> Self {
        let mut imports = vec![TOOL_IMPORT.to_string(), SERVICE_IMPORT.to_string()];
        if field_injection {
            imports.push(AUTOWIRED_IMPORT.to_string());
        }
        for extra in extra_imports {
            if !imports.contains(extra) {
                imports.push(extra.clone());
            }
        }
        if identity.target_package != service.declared_package
            && service.qualified_name.contains('.')
            && !imports.contains(&service.qualified_name)
        {
            imports.push(service.qualified_name.clone());
        }

        Self {
            package: identity.target_package.clone(),
            imports,
            service: service.simple_name.clone(),
            facade: identity.simple_name.clone(),
            field_injection,
            version: crate::VERSION.to_string(),
            generated_on: generated_on.to_string(),
        }
    }
}

/// Context for one method block
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    /// Raw description text, escaped by the template
    pub description: String,
    pub return_type: String,
    /// `Type a, Type b`
    pub parameters: String,
    /// `a, b`
    pub arguments: String,
    pub returns_value: bool,
}

/// `void`, also behind type parameters as in `<T> void`
fn is_void(return_type: &str) -> bool {
    return_type
        .rsplit(|c: char| c == '>' || c.is_whitespace())
        .next()
        == Some("void")
}

impl MethodContext {
    pub fn from_method(method: &MethodDeclaration) -> Self {
        let description = method
            .description
            .as_deref()
            .filter(|d| !sanitize_description(d).is_empty())
            .unwrap_or(&method.name)
            .to_string();

        let parameters = method
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.typ, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let arguments = method
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let return_type = method.return_type.trim();
        let return_type = if return_type.is_empty() {
            "void"
        } else {
            return_type
        };

        Self {
            name: method.name.clone(),
            description,
            return_type: return_type.to_string(),
            parameters,
            arguments,
            returns_value: !is_void(return_type),
        }
    }
}

/// Context shared by all scaffold templates
#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldContext {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub framework_version: String,
    pub library_version: String,
    pub annotations_version: String,
}
