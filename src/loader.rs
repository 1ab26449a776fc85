//! This module provides the `SpecLoader` struct, responsible for loading machine
//! descriptions from files, directories and strings.

use crate::parser::parse;
use crate::types::{LoadError, Spec, MAX_DESCRIPTION_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of machine descriptions.
pub const EXTENSION: &str = "tm";

/// `SpecLoader` is a utility struct for loading machine descriptions.
pub struct SpecLoader;

impl SpecLoader {
    /// Loads a machine description from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Spec)` if the file is read and parsed successfully.
    /// * `Err(LoadError::File)` if the file cannot be read or is too large.
    /// * Any parse or validation `LoadError` otherwise.
    pub fn load_file(path: &Path) -> Result<Spec, LoadError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LoadError::File(format!("failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "loading machine");

        Self::load_str(&content)
    }

    /// Loads a machine description from string content.
    pub fn load_str(content: &str) -> Result<Spec, LoadError> {
        if content.len() > MAX_DESCRIPTION_SIZE {
            return Err(LoadError::File(format!(
                "machine description is {} bytes, limit is {} bytes",
                content.len(),
                MAX_DESCRIPTION_SIZE
            )));
        }

        parse(content)
    }

    /// Loads every `.tm` file in `directory`, sorted by path.
    ///
    /// Each file is loaded independently: one broken description does not prevent the
    /// others from loading. Subdirectories and other files are skipped.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Spec), LoadError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(LoadError::File(format!(
                    "failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(LoadError::File(format!(
                    "failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();
        results.extend(
            paths
                .into_iter()
                .map(|path| Self::load_file(&path).map(|spec| (path, spec))),
        );

        results
    }
}
