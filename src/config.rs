//! Inlining configuration and the compiled matching rule.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InlineError, InlineResult};
use crate::models::Placement;

/// File name searched for by [`InlineConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "inline-source.config.json";

/// How a tag that matches the rule but resolves to no artifact is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingAssetPolicy {
  /// Leave the tag as an external reference.
  #[default]
  Ignore,
  /// Leave the tag as an external reference and log a warning.
  Warn,
  /// Fail the pass.
  Error,
}

/// Per-document inlining options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlineConfig {
  /// Regular expression selecting which references are inlined. Absent or empty disables
  /// inlining.
  #[serde(alias = "inline_source")]
  pub inline_source: Option<String>,
  /// Handling of matching tags whose artifact cannot be found.
  #[serde(alias = "missing_asset")]
  pub missing_asset: MissingAssetPolicy,
  /// Group every inlined tag is moved into, when set.
  #[serde(alias = "inject_target")]
  pub inject_target: Option<Placement>,
}

impl InlineConfig {
  /// Configuration inlining every reference matching `pattern`.
  pub fn with_pattern(pattern: impl Into<String>) -> Self {
    Self {
      inline_source: Some(pattern.into()),
      ..Self::default()
    }
  }

  /// Load configuration from `dir`, falling back to defaults when no file exists there.
  pub fn discover(dir: &Path) -> InlineResult<Self> {
    Self::load_from_path(dir.join(DEFAULT_CONFIG_FILE))
  }

  /// Read configuration from a JSON file. A missing file yields the defaults; a file that
  /// exists but cannot be read or parsed is an error.
  pub fn load_from_path(path: impl AsRef<Path>) -> InlineResult<Self> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(InlineError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    serde_json::from_str(&contents).map_err(|err| InlineError::Config {
      path: path.to_path_buf(),
      source: err,
    })
  }

  /// Compile the matching rule, or `None` when inlining is disabled.
  pub fn matching_rule(&self) -> InlineResult<Option<MatchingRule>> {
    match self.inline_source.as_deref() {
      None | Some("") => Ok(None),
      Some(pattern) => MatchingRule::new(pattern).map(Some),
    }
  }
}

/// User-supplied pattern deciding which references are eligible for inlining.
///
/// No anchoring is added; the pattern is tested against the raw attribute value.
#[derive(Debug, Clone)]
pub struct MatchingRule {
  regex: Regex,
}

impl MatchingRule {
  /// Compile `pattern`.
  pub fn new(pattern: &str) -> InlineResult<Self> {
    let regex = Regex::new(pattern).map_err(|source| InlineError::InvalidPattern {
      pattern: pattern.to_string(),
      source,
    })?;
    Ok(Self { regex })
  }

  /// Returns `true` when `reference` is eligible.
  pub fn is_match(&self, reference: &str) -> bool {
    self.regex.is_match(reference)
  }

  /// Source pattern.
  pub fn as_str(&self) -> &str {
    self.regex.as_str()
  }
}
