//! Build-level context shared by every tag processed for one generated document.

use std::path::PathBuf;

use crate::asset_paths::clean_posix;

/// Sentinel public path meaning "resolve at runtime", treated as no prefix.
pub const AUTO_PUBLIC_PATH: &str = "auto";

/// Normalised output public-path prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PublicPath {
  /// Absent, empty or `auto`.
  #[default]
  None,
  /// Explicit URL prefix prepended to every emitted asset reference.
  Prefix(String),
}

impl PublicPath {
  /// Normalise a raw public-path setting.
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      None | Some("") | Some(AUTO_PUBLIC_PATH) => Self::None,
      Some(value) => Self::Prefix(value.to_string()),
    }
  }

  /// Raw prefix when one is configured.
  pub fn prefix(&self) -> Option<&str> {
    match self {
      Self::None => None,
      Self::Prefix(value) => Some(value),
    }
  }

  /// Prepend the prefix to an output-root-relative path.
  ///
  /// Plain path prefixes are lexically cleaned after joining; prefixes carrying a scheme or
  /// starting with `//` are kept verbatim since cleaning would collapse their `//`.
  pub fn join(&self, path: &str) -> String {
    let Self::Prefix(prefix) = self else {
      return path.to_string();
    };

    let joined = format!(
      "{}/{}",
      prefix.trim_end_matches('/'),
      path.trim_start_matches('/')
    );
    if is_url_prefix(prefix) {
      joined
    } else {
      clean_posix(&joined)
    }
  }
}

fn is_url_prefix(prefix: &str) -> bool {
  prefix.starts_with("//") || prefix.contains("://")
}

/// Read-only description of the build producing the current document.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Absolute output directory all artifact names are relative to.
  pub output_dir: PathBuf,
  /// Normalised public-path prefix.
  pub public_path: PublicPath,
  /// Declared output filename of the HTML document, possibly nested.
  pub html_filename: String,
}

impl BuildContext {
  /// Create a context for a document written to `html_filename` inside `output_dir`.
  pub fn new(
    output_dir: impl Into<PathBuf>,
    public_path: Option<&str>,
    html_filename: impl Into<String>,
  ) -> Self {
    Self {
      output_dir: output_dir.into(),
      public_path: PublicPath::parse(public_path),
      html_filename: html_filename.into(),
    }
  }

  /// Directory component of the HTML output filename, if it has one.
  pub fn document_dir(&self) -> Option<&str> {
    let filename = self.html_filename.trim_start_matches("./");
    let (dir, _) = filename.rsplit_once(['/', '\\'])?;
    (!dir.is_empty()).then_some(dir)
  }
}
