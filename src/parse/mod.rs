//! Declaration discovery from Java sources
//!
//! [`JavaSourceProvider`] turns each input (a `.java` file or a directory
//! searched recursively) into one discovery round.

pub mod java;

pub use java::parse_java;

use crate::declaration::{DeclarationProvider, Round};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Provider reading `@MCPService` classes from Java source files
#[derive(Debug)]
pub struct JavaSourceProvider {
    inputs: VecDeque<PathBuf>,
}

impl JavaSourceProvider {
    pub fn new(inputs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }

    fn load(input: &Path) -> Result<Round> {
        let files = if input.is_dir() {
            let mut files = Vec::new();
            collect_java_files(input, &mut files)?;
            files.sort();
            files
        } else if input.is_file() {
            vec![input.to_path_buf()]
        } else {
            return Err(Error::Declaration(format!(
                "{} does not exist",
                input.display()
            )));
        };

        let mut round = Round::default();
        for file in files {
            let source = std::fs::read_to_string(&file).map_err(Error::Io)?;
            match parse_java(&source) {
                Ok(services) => {
                    debug!(file = %file.display(), services = services.len(), "Parsed Java source");
                    round.services.extend(services);
                }
                Err(e) => warn!(file = %file.display(), "Skipping unparsable source: {}", e),
            }
        }
        Ok(round)
    }
}

impl DeclarationProvider for JavaSourceProvider {
    fn next_round(&mut self) -> Result<Option<Round>> {
        match self.inputs.pop_front() {
            Some(input) => Self::load(&input).map(Some),
            None => Ok(None),
        }
    }
}

fn collect_java_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(Error::Io)? {
        let path = entry.map_err(Error::Io)?.path();
        if path.is_dir() {
            collect_java_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "java") {
            files.push(path);
        }
    }
    Ok(())
}
