// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # facadegen - incremental MCP facade synthesis
//!
//! Generates one facade class per service so that the service's public
//! methods can be called as MCP tools, and keeps those facades growing as
//! services gain methods without ever rewriting what is already there.
//!
//! ## Core Concept
//!
//! A facade is created once and then only appended to:
//!
//! - **New service**: the full facade is emitted with one block per method
//! - **Known service, new method**: one block is spliced in before the
//!   closing brace
//! - **Known method**: left alone, even if its signature or description
//!   changed (`facadegen status` reports those as stale)
//!
//! Which methods a facade already has is answered by a sidecar manifest
//! while it matches the file, and by scanning the facade text otherwise.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use facadegen::{FacadeConfig, MethodDeclaration, ServiceDeclaration, Session};
//!
//! let config = FacadeConfig::default();
//! let mut session = Session::from_config(&config, Some("src/main/java".as_ref()))?;
//!
//! let weather = ServiceDeclaration::new("com.demo.service.Weather")
//!     .with_override_package("com.demo.mcp")
//!     .with_method(
//!         MethodDeclaration::new("getWeather", "String")
//!             .param("cityName", "String")
//!             .described("Get weather information for a specific city"),
//!     );
//!
//! session.synthesize(&weather);
//! // src/main/java/com/demo/mcp/WeatherFacade.java now exists
//! ```
//!
//! ## Architecture
//!
//! ```text
//! DeclarationProvider ──► Session ──► Locator ──► ArtifactIdentity
//!  (YAML, Java, static)      │
//!                            ├── absent  ──► Renderer ──► full artifact + manifest
//!                            │
//!                            └── present ──► MemberIndex ──► Patcher ──► fragment
//! ```

pub mod config;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod index;
pub mod locate;
pub mod logging;
pub mod manifest;
pub mod parse;
pub mod patch;
pub mod render;
pub mod scaffold;
pub mod templates;
pub mod util;

// Re-exports
pub use config::{FacadeConfig, Wiring};
pub use declaration::{
    DeclarationProvider, MethodAddition, MethodDeclaration, Parameter, Round, ServiceDeclaration,
    StaticProvider, YamlProvider,
};
pub use engine::{ArtifactStatus, MethodOutcome, ServiceOutcome, Session, SessionReport};
pub use error::{Error, Result};
pub use index::{IndexSource, MemberIndex};
pub use locate::{ArtifactIdentity, Locator};
pub use manifest::ArtifactManifest;
pub use parse::{parse_java, JavaSourceProvider};
pub use patch::{patch, InsertionSource, PatchOutcome};
pub use render::{Fragment, RenderConfig, RenderedArtifact, Renderer};
pub use scaffold::{scaffold, ScaffoldRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
