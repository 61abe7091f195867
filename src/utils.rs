// ABOUTME: Utility functions for the darsy application
// ABOUTME: Path checks for inputs and outputs, store directory probing and export file names

use crate::errors::{LessonError, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Check that an input (lesson JSON, stroke log, image) is an existing file.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LessonError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(LessonError::ValidationError(format!(
            "Expected a file but found a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Create `dir` and any missing ancestors.
pub fn create_dir_if_missing(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(LessonError::ValidationError(format!(
            "Cannot use {:?} as a directory",
            dir
        )));
    }
    debug!("Creating directory {:?}", dir);
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Make sure an export target can be created.
pub fn prepare_output(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_if_missing(parent),
        _ => Ok(()),
    }
}

/// Create the store directory and prove it accepts writes.
pub fn probe_store_dir(dir: &Path) -> Result<()> {
    create_dir_if_missing(dir)
        .map_err(|e| LessonError::PersistenceError(format!("Cannot open store {:?}: {}", dir, e)))?;

    let probe = dir.join(format!(".probe-{}", uuid::Uuid::new_v4()));
    fs::write(&probe, b"").map_err(|e| {
        LessonError::PersistenceError(format!("Store {:?} is read-only: {}", dir, e))
    })?;
    if let Err(e) = fs::remove_file(&probe) {
        warn!("Could not remove store probe {:?}: {}", probe, e);
    }
    Ok(())
}

/// `file://` URL of an existing local file, for loading it in a browser.
pub fn file_url(path: &Path) -> Result<String> {
    let absolute = fs::canonicalize(path)?;
    url::Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| LessonError::ValidationError(format!("Not a local file path: {:?}", absolute)))
}

/// Turn free text into a file name stem: whitespace runs become `_`, path
/// separators and reserved characters are dropped. Non-ASCII letters are kept.
pub fn file_stem_for(text: &str) -> String {
    let stem = text
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if stem.is_empty() {
        "lesson".to_string()
    } else {
        stem
    }
}
