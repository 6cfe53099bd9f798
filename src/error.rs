//! Error type shared by the inlining pass and its configuration loader.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while configuring or running an inlining pass.
///
/// Non-matching tags, missing source maps and unsupported tag types are never errors; they
/// leave the tag untouched. Only configuration problems, unreadable artifacts and (under the
/// strict policy) missing assets reach the caller.
#[derive(Debug, Error)]
pub enum InlineError {
  /// The matching rule is not a valid regular expression.
  #[error("invalid inline source pattern `{pattern}`")]
  InvalidPattern {
    /// Pattern as supplied by the user.
    pattern: String,
    /// Compilation error reported by the regex engine.
    source: regex::Error,
  },
  /// A tag matched the rule but no artifact could be resolved for it.
  #[error("no build artifact found for `{reference}` (resolved key `{key}`)")]
  MissingAsset {
    /// Raw reference taken from the tag attribute.
    reference: String,
    /// Artifact key computed from the reference.
    key: String,
  },
  /// Artifact content could not be retrieved.
  #[error("failed to read artifact `{name}`")]
  ArtifactRead {
    /// Artifact table key.
    name: String,
    /// Underlying I/O failure.
    source: std::io::Error,
  },
  /// The configuration file exists but could not be parsed.
  #[error("failed to parse {}", path.display())]
  Config {
    /// Path of the configuration file.
    path: PathBuf,
    /// JSON parse failure.
    source: serde_json::Error,
  },
  /// Filesystem access failed outside of artifact content retrieval.
  #[error("failed to access {}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
}

/// Result alias used across the crate.
pub type InlineResult<T> = Result<T, InlineError>;
