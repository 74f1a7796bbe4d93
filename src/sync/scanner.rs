//! Directory scanner - classifies files into declaration and set candidates.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Fatal scan failures. Reconciling against a partial inventory is unsafe,
/// so any walk error aborts the run before a single network call is made.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Everything a sync run will act on, in walk order.
///
/// Walk order is whatever the platform's directory iteration yields; it is
/// not stable across platforms, which is fine because every downstream
/// operation is idempotent and order-independent.
#[derive(Debug, Default)]
pub struct Inventory {
    pub declarations: Vec<PathBuf>,
    pub sets: Vec<PathBuf>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.sets.is_empty()
    }
}

/// Walk `root` and classify every regular file, regardless of subdirectory:
///
/// - `.json` suffix (case-insensitive): declaration candidate
/// - base name starting with `set` (case-SENSITIVE) and `.txt` suffix
///   (case-insensitive): set candidate
/// - anything else is ignored
pub fn scan(root: &Path) -> Result<Inventory, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }

    let mut inventory = Inventory::default();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if ends_with_ignore_case(&name, ".json") {
            inventory.declarations.push(entry.into_path());
        } else if name.starts_with("set") && ends_with_ignore_case(&name, ".txt") {
            inventory.sets.push(entry.into_path());
        }
    }

    Ok(inventory)
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}
