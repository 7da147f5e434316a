//! Service declarations and the providers that supply them
//!
//! The engine never inspects source or compiled code itself. A
//! [`DeclarationProvider`] hands it already-resolved [`ServiceDeclaration`]
//! records, one [`Round`] at a time.

use crate::error::{Error, Result};
use crate::util::split_qualified_name;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A service type whose public methods are exposed through a facade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceDeclaration {
    /// Fully qualified source name, the identity of the declaration
    pub qualified_name: String,

    /// Simple type name (last segment of the qualified name)
    #[serde(default)]
    pub simple_name: String,

    /// Package the service is declared in
    #[serde(default)]
    pub declared_package: String,

    /// Package the facade should be generated into instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_package: Option<String>,

    /// Public methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
}

/// A public method of a service
///
/// Identity is the name only; overloads share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodDeclaration {
    pub name: String,

    pub return_type: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Free-text description; the method name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
}

impl ServiceDeclaration {
    /// Build a declaration from a qualified name, deriving package and simple name
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let (package, simple) = split_qualified_name(&qualified_name);
        Self {
            simple_name: simple.to_string(),
            declared_package: package.to_string(),
            qualified_name,
            override_package: None,
            methods: Vec::new(),
        }
    }

    pub fn with_override_package(mut self, package: impl Into<String>) -> Self {
        self.override_package = Some(package.into());
        self
    }

    pub fn with_method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            description: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, typ: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            typ: typ.into(),
        });
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A method reported on an already-known service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodAddition {
    /// Qualified name of the owning service
    pub service: String,
    pub method: MethodDeclaration,
}

/// One discovery round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Round {
    #[serde(default)]
    pub services: Vec<ServiceDeclaration>,

    #[serde(default)]
    pub added_methods: Vec<MethodAddition>,
}

impl Round {
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.added_methods.is_empty()
    }
}

/// Source of service declarations
///
/// Called repeatedly until it returns `Ok(None)`. An `Err` abandons the
/// round it was producing; the session moves on to the next one.
pub trait DeclarationProvider {
    fn next_round(&mut self) -> Result<Option<Round>>;
}

/// In-memory provider, one queued round per call
#[derive(Debug, Default)]
pub struct StaticProvider {
    rounds: VecDeque<Round>,
}

impl StaticProvider {
    pub fn new(rounds: impl IntoIterator<Item = Round>) -> Self {
        Self {
            rounds: rounds.into_iter().collect(),
        }
    }

    /// Single round containing the given services
    pub fn services(services: Vec<ServiceDeclaration>) -> Self {
        Self::new([Round {
            services,
            added_methods: Vec::new(),
        }])
    }
}

impl DeclarationProvider for StaticProvider {
    fn next_round(&mut self) -> Result<Option<Round>> {
        Ok(self.rounds.pop_front())
    }
}

/// Reads declaration files (YAML or JSON), one round per file
///
/// ```yaml
/// services:
///   - qualified_name: com.demo.service.WeatherService
///     simple_name: WeatherService
///     declared_package: com.demo.service
///     override_package: com.demo.mcp
///     methods:
///       - name: getWeather
///         return_type: String
///         parameters:
///           - { name: cityName, type: String }
///         description: Get weather information for a specific city
/// added_methods: []
/// ```
#[derive(Debug)]
pub struct YamlProvider {
    files: VecDeque<PathBuf>,
}

impl YamlProvider {
    pub fn new(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Parse a single declaration document
    pub fn parse(content: &str) -> Result<Round> {
        let mut round: Round = serde_norway::from_str(content)?;
        for service in &mut round.services {
            normalize(service)?;
        }
        Ok(round)
    }

    fn load(path: &Path) -> Result<Round> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&content).map_err(|e| {
            Error::Declaration(format!("Failed to read {}: {}", path.display(), e))
        })
    }
}

impl DeclarationProvider for YamlProvider {
    fn next_round(&mut self) -> Result<Option<Round>> {
        match self.files.pop_front() {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }
}

/// Fill in names a hand-written declaration may omit and reject unusable ones
fn normalize(service: &mut ServiceDeclaration) -> Result<()> {
    if service.qualified_name.trim().is_empty() {
        return Err(Error::Declaration(
            "service declaration without qualified_name".into(),
        ));
    }
    let (package, simple) = split_qualified_name(&service.qualified_name);
    if service.simple_name.is_empty() {
        service.simple_name = simple.to_string();
    }
    if service.declared_package.is_empty() {
        service.declared_package = package.to_string();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_derives_names() {
        let decl = ServiceDeclaration::new("com.demo.service.Weather")
            .with_override_package("com.demo.mcp")
            .with_method(
                MethodDeclaration::new("getWeather", "String").param("cityName", "String"),
            );

        assert_eq!(decl.simple_name, "Weather");
        assert_eq!(decl.declared_package, "com.demo.service");
        assert_eq!(decl.override_package.as_deref(), Some("com.demo.mcp"));
        assert_eq!(decl.methods[0].parameters[0].typ, "String");
    }

    #[test]
    fn test_parse_yaml_round() {
        let round = YamlProvider::parse(
            r#"
services:
  - qualified_name: com.demo.service.WeatherService
    methods:
      - name: getWeather
        return_type: String
        parameters:
          - name: cityName
            type: String
        description: Get weather information for a specific city
added_methods:
  - service: com.demo.service.WeatherService
    method:
      name: getForecast
      return_type: String
"#,
        )
        .unwrap();

        assert_eq!(round.services.len(), 1);
        let service = &round.services[0];
        assert_eq!(service.simple_name, "WeatherService");
        assert_eq!(service.declared_package, "com.demo.service");
        assert_eq!(service.methods[0].parameters[0].name, "cityName");
        assert_eq!(round.added_methods[0].method.name, "getForecast");
        assert!(round.added_methods[0].method.parameters.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_identity() {
        let err = YamlProvider::parse("services:\n  - qualified_name: ''\n    simple_name: X\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_static_provider_drains_in_order() {
        let mut provider = StaticProvider::new([
            Round {
                services: vec![ServiceDeclaration::new("a.A")],
                added_methods: vec![],
            },
            Round::default(),
        ]);
        let first = provider.next_round().unwrap().unwrap();
        assert_eq!(first.services[0].simple_name, "A");
        assert!(provider.next_round().unwrap().unwrap().is_empty());
        assert!(provider.next_round().unwrap().is_none());
    }
}
