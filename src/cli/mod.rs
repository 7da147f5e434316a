//! CLI command implementations
//!
//! - `generate`: create and extend facades, plus the read-only `status`
//! - `scaffold`: demo project generation and JSON schemas
//! - `util`: argument parsing and input selection

pub mod generate;
pub mod scaffold;
pub mod util;

pub use generate::{cmd_generate, cmd_status};
pub use scaffold::{cmd_scaffold, cmd_schema};
