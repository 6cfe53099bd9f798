//! Named build outputs available for inlining.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::asset_paths::{prefix_relative_key, to_slash};
use crate::error::{InlineError, InlineResult};
use crate::project::PublicPath;

/// A built output file whose content is produced on demand.
pub trait Artifact {
  /// Raw content of the artifact.
  fn source(&self) -> std::io::Result<Cow<'_, [u8]>>;
}

impl Artifact for String {
  fn source(&self) -> std::io::Result<Cow<'_, [u8]>> {
    Ok(Cow::Borrowed(self.as_bytes()))
  }
}

impl Artifact for &'static str {
  fn source(&self) -> std::io::Result<Cow<'_, [u8]>> {
    Ok(Cow::Borrowed(self.as_bytes()))
  }
}

impl Artifact for Vec<u8> {
  fn source(&self) -> std::io::Result<Cow<'_, [u8]>> {
    Ok(Cow::Borrowed(self))
  }
}

/// Artifact backed by a file that is only read when its content is requested.
#[derive(Debug, Clone)]
pub struct FileArtifact {
  path: PathBuf,
}

impl FileArtifact {
  /// Reference the file at `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl Artifact for FileArtifact {
  fn source(&self) -> std::io::Result<Cow<'_, [u8]>> {
    fs::read(&self.path).map(Cow::Owned)
  }
}

/// Mapping from output-root-relative artifact name to artifact.
#[derive(Default)]
pub struct ArtifactTable {
  entries: BTreeMap<String, Box<dyn Artifact>>,
}

impl std::fmt::Debug for ArtifactTable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_set().entries(self.entries.keys()).finish()
  }
}

impl ArtifactTable {
  /// Create an empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register an artifact under `name`, replacing any previous entry.
  pub fn insert(&mut self, name: impl Into<String>, artifact: impl Artifact + 'static) {
    self.entries.insert(name.into(), Box::new(artifact));
  }

  /// Exact lookup by name.
  pub fn get(&self, name: &str) -> Option<&dyn Artifact> {
    self.entries.get(name).map(|artifact| &**artifact)
  }

  /// Iterate over the registered names in sorted order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  /// Number of registered artifacts.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no artifact is registered.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Register every file below `output_dir` as a lazily read [`FileArtifact`].
  ///
  /// Names are relative to `output_dir` with forward slashes. Hidden files and directories are
  /// skipped.
  pub fn scan_dir(output_dir: &Path) -> InlineResult<Self> {
    let mut table = Self::new();
    collect_files_recursively(output_dir, Path::new(""), &mut table)?;
    Ok(table)
  }
}

impl<A: Artifact + 'static> FromIterator<(String, A)> for ArtifactTable {
  fn from_iter<I: IntoIterator<Item = (String, A)>>(iter: I) -> Self {
    let mut table = Self::new();
    for (name, artifact) in iter {
      table.insert(name, artifact);
    }
    table
  }
}

fn collect_files_recursively(
  dir: &Path,
  relative_root: &Path,
  table: &mut ArtifactTable,
) -> InlineResult<()> {
  let entries = fs::read_dir(dir).map_err(|source| InlineError::Io {
    path: dir.to_path_buf(),
    source,
  })?;

  for entry in entries {
    let entry = entry.map_err(|source| InlineError::Io {
      path: dir.to_path_buf(),
      source,
    })?;
    let file_name = entry.file_name();
    if file_name.to_string_lossy().starts_with('.') {
      continue;
    }

    let path = entry.path();
    let relative = relative_root.join(&file_name);
    let file_type = entry.file_type().map_err(|source| InlineError::Io {
      path: path.clone(),
      source,
    })?;

    if file_type.is_dir() {
      collect_files_recursively(&path, &relative, table)?;
    } else if file_type.is_file() {
      table.insert(to_slash(&relative), FileArtifact::new(path));
    }
  }

  Ok(())
}

/// Lookup structure resolving artifact keys against a table once per pass.
///
/// Collaborators do not agree on how artifact names are stored (with or without the
/// public-path prefix, absolute or relative), so besides exact matches every table name is
/// indexed by its prefix-relative form. The index is built once, replacing a linear scan per
/// unresolved tag.
pub struct ArtifactIndex<'t> {
  table: &'t ArtifactTable,
  normalised: BTreeMap<String, &'t str>,
}

impl<'t> ArtifactIndex<'t> {
  /// Index every table name relative to `public_path`.
  ///
  /// When several names normalise to the same key the first in sorted order wins.
  pub fn new(table: &'t ArtifactTable, public_path: &PublicPath) -> Self {
    let mut normalised = BTreeMap::new();
    for name in table.names() {
      normalised
        .entry(prefix_relative_key(name, public_path))
        .or_insert(name);
    }

    Self { table, normalised }
  }

  /// Resolve `key` to the stored name and artifact, trying an exact match first.
  pub fn resolve(&self, key: &str) -> Option<(&'t str, &'t dyn Artifact)> {
    if let Some((name, artifact)) = self.table.entries.get_key_value(key) {
      return Some((name.as_str(), &**artifact));
    }

    let name = *self.normalised.get(key)?;
    self.table.get(name).map(|artifact| (name, artifact))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn content(artifact: &dyn Artifact) -> String {
    String::from_utf8(artifact.source().unwrap().into_owned()).unwrap()
  }

  #[test]
  fn resolves_exact_names_first() {
    let table: ArtifactTable = [
      ("main.js".to_string(), "exact"),
      ("/main.js".to_string(), "rooted"),
    ]
    .into_iter()
    .collect();
    let index = ArtifactIndex::new(&table, &PublicPath::None);

    let (name, artifact) = index.resolve("main.js").unwrap();
    assert_eq!(name, "main.js");
    assert_eq!(content(artifact), "exact");
  }

  #[test]
  fn falls_back_to_prefix_relative_names() {
    let mut table = ArtifactTable::new();
    table.insert("/assets/style.css", "body{}".to_string());
    let public = PublicPath::parse(Some("/assets/"));
    let index = ArtifactIndex::new(&table, &public);

    let (name, artifact) = index.resolve("style.css").unwrap();
    assert_eq!(name, "/assets/style.css");
    assert_eq!(content(artifact), "body{}");
    assert!(index.resolve("missing.css").is_none());
  }

  #[test]
  fn falls_back_to_cleaned_names() {
    let mut table = ArtifactTable::new();
    table.insert("./bin/app.js", "app".to_string());
    let index = ArtifactIndex::new(&table, &PublicPath::None);

    assert_eq!(index.resolve("bin/app.js").unwrap().0, "./bin/app.js");
  }

  #[test]
  fn scans_output_directory_lazily() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("bin")).unwrap();
    fs::write(root.join("bin/app.js"), "console.log(1)").unwrap();
    fs::write(root.join("style.css"), "body{}").unwrap();
    fs::write(root.join(".hidden"), "skip").unwrap();

    let table = ArtifactTable::scan_dir(root).unwrap();
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["bin/app.js", "style.css"]);

    fs::write(root.join("style.css"), "body{color:red}").unwrap();
    assert_eq!(content(table.get("style.css").unwrap()), "body{color:red}");
  }

  #[test]
  fn reports_unreadable_output_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = ArtifactTable::scan_dir(&missing).unwrap_err();
    assert!(matches!(err, InlineError::Io { path, .. } if path == missing));
  }
}
