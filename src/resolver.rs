//! Tag resolution: deciding which tags are inlined and producing their replacements.

use std::borrow::Cow;

use regex::Regex;

use crate::artifacts::{ArtifactIndex, ArtifactTable};
use crate::asset_paths::artifact_key;
use crate::config::{InlineConfig, MatchingRule, MissingAssetPolicy};
use crate::error::{InlineError, InlineResult};
use crate::models::{AssetTags, Placement, Tag, TagKind};
use crate::project::BuildContext;
use crate::sourcemap::{SourceMapLocator, SourceMapRelocator, TrailingCommentLocator};

/// Outcome of resolving a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// The tag was replaced by an inline element.
  Inlined(Tag),
  /// The tag is returned exactly as it was received.
  PassThrough(Tag),
}

impl Resolution {
  /// Resulting tag regardless of outcome.
  pub fn into_tag(self) -> Tag {
    match self {
      Self::Inlined(tag) | Self::PassThrough(tag) => tag,
    }
  }

  /// Returns `true` when the tag was inlined.
  pub fn is_inlined(&self) -> bool {
    matches!(self, Self::Inlined(_))
  }
}

/// Resolves individual tags against the artifacts of one build.
pub struct TagResolver<'a, L = TrailingCommentLocator> {
  rule: &'a MatchingRule,
  index: &'a ArtifactIndex<'a>,
  context: &'a BuildContext,
  relocator: &'a SourceMapRelocator<L>,
  missing_asset: MissingAssetPolicy,
}

impl<'a, L: SourceMapLocator> TagResolver<'a, L> {
  /// Create a resolver for one document pass.
  pub fn new(
    rule: &'a MatchingRule,
    index: &'a ArtifactIndex<'a>,
    context: &'a BuildContext,
    relocator: &'a SourceMapRelocator<L>,
    missing_asset: MissingAssetPolicy,
  ) -> Self {
    Self {
      rule,
      index,
      context,
      relocator,
      missing_asset,
    }
  }

  /// Inline `tag` when it is a script or stylesheet whose reference matches the rule and
  /// resolves to an artifact; otherwise hand it back untouched.
  pub fn resolve(&self, tag: Tag) -> InlineResult<Resolution> {
    let kind = tag.kind();
    let Some(reference) = kind.reference() else {
      return Ok(Resolution::PassThrough(tag));
    };
    if !self.rule.is_match(reference) {
      tracing::debug!(reference, "Reference does not match inline pattern");
      return Ok(Resolution::PassThrough(tag));
    }

    let key = artifact_key(reference, self.context);
    let Some((name, artifact)) = self.index.resolve(&key) else {
      return self.missing(tag, &key);
    };

    let bytes = artifact.source().map_err(|source| InlineError::ArtifactRead {
      name: name.to_string(),
      source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let content = self.relocator.relocate(&text, &key, self.context);

    let inlined = if let TagKind::Script { .. } = kind {
      Tag::inline_script(escape_script_close(&content))
    } else {
      Tag::inline_style(content)
    };
    tracing::info!(reference, artifact = name, tag = %inlined.tag_name, "Inlined asset");
    Ok(Resolution::Inlined(inlined))
  }

  fn missing(&self, tag: Tag, key: &str) -> InlineResult<Resolution> {
    let reference = tag.kind().reference().unwrap_or_default().to_string();
    match self.missing_asset {
      MissingAssetPolicy::Ignore => {
        tracing::debug!(%reference, key, "No artifact for matching reference");
        Ok(Resolution::PassThrough(tag))
      }
      MissingAssetPolicy::Warn => {
        tracing::warn!(%reference, key, "No artifact for matching reference, leaving tag external");
        Ok(Resolution::PassThrough(tag))
      }
      MissingAssetPolicy::Error => Err(InlineError::MissingAsset {
        reference,
        key: key.to_string(),
      }),
    }
  }
}

fn script_close_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)<(/script(?:[\t\n\x0C\r />]|$))").expect("invalid script close regex")
  })
}

/// Escape every `</script` (any ASCII case) that the HTML tokenizer would read as an end tag,
/// so inline content cannot terminate its element. Longer names such as `</scripts` are kept.
pub fn escape_script_close(content: &str) -> Cow<'_, str> {
  script_close_pattern().replace_all(content, r"\x3C${1}")
}

/// Document-level inlining pass over the head and body tag groups.
#[derive(Debug, Clone)]
pub struct InlineSource<L = TrailingCommentLocator> {
  config: InlineConfig,
  context: BuildContext,
  relocator: SourceMapRelocator<L>,
}

impl InlineSource {
  /// Pass using the trailing comment source-map convention.
  pub fn new(config: InlineConfig, context: BuildContext) -> Self {
    Self::with_locator(config, context, TrailingCommentLocator)
  }
}

impl<L: SourceMapLocator> InlineSource<L> {
  /// Pass using a custom source-map locator.
  pub fn with_locator(config: InlineConfig, context: BuildContext, locator: L) -> Self {
    Self {
      config,
      context,
      relocator: SourceMapRelocator::with_locator(locator),
    }
  }

  /// Resolve every tag of a document.
  ///
  /// Group order is preserved and no tag is dropped. When an injection target is configured,
  /// inlined tags from the other group are appended to the target group in their original
  /// order.
  pub fn process_tags(&self, tags: AssetTags, artifacts: &ArtifactTable) -> InlineResult<AssetTags> {
    let Some(rule) = self.config.matching_rule()? else {
      tracing::debug!("Inline pattern not configured, leaving tags untouched");
      return Ok(tags);
    };

    let index = ArtifactIndex::new(artifacts, &self.context.public_path);
    let resolver = TagResolver::new(
      &rule,
      &index,
      &self.context,
      &self.relocator,
      self.config.missing_asset,
    );

    let AssetTags { head, body } = tags;
    let mut output = AssetTags::default();
    let mut relocated: Vec<(Placement, Tag)> = Vec::new();
    let mut inlined_count = 0usize;

    for (placement, group) in [(Placement::Head, head), (Placement::Body, body)] {
      for tag in group {
        match resolver.resolve(tag)? {
          Resolution::Inlined(tag) => {
            inlined_count += 1;
            match self.config.inject_target {
              Some(target) if target != placement => relocated.push((target, tag)),
              _ => output.group_mut(placement).push(tag),
            }
          }
          Resolution::PassThrough(tag) => output.group_mut(placement).push(tag),
        }
      }
    }

    let moved_count = relocated.len();
    for (target, tag) in relocated {
      output.group_mut(target).push(tag);
    }

    tracing::info!(
      document = %self.context.html_filename,
      pattern = rule.as_str(),
      tags = output.len(),
      inlined = inlined_count,
      moved = moved_count,
      "Inline source pass completed"
    );
    Ok(output)
  }
}
