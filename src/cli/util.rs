//! CLI utility helpers

use facadegen::{
    DeclarationProvider, Error, FacadeConfig, JavaSourceProvider, Result, Round, YamlProvider,
};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Flags that take a value
pub const VALUE_FLAGS: &[&str] = &[
    "--root",
    "--config",
    "--output",
    "-o",
    "--group-id",
    "--artifact-id",
    "--version",
    "--framework-version",
    "--library-version",
];

/// Value following a flag, e.g. `--root <dir>`
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither flags nor flag values
pub fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

/// Load `--config <file>`, else `facadegen.yaml` in the working directory, else defaults
pub fn load_config(args: &[String]) -> Result<FacadeConfig> {
    if let Some(path) = flag_value(args, "--config") {
        return FacadeConfig::load(path.as_ref());
    }
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    Ok(FacadeConfig::load_from_dir(&cwd)?.unwrap_or_default())
}

/// Picks a provider per input: declaration files by extension, Java otherwise
pub struct InputProvider {
    inputs: VecDeque<PathBuf>,
}

impl InputProvider {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(PathBuf::from).collect(),
        }
    }
}

impl DeclarationProvider for InputProvider {
    fn next_round(&mut self) -> Result<Option<Round>> {
        let Some(input) = self.inputs.pop_front() else {
            return Ok(None);
        };
        let is_declaration_file = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"));

        let round = if is_declaration_file {
            YamlProvider::new([input]).next_round()?
        } else {
            JavaSourceProvider::new([input]).next_round()?
        };
        Ok(Some(round.unwrap_or_default()))
    }
}
