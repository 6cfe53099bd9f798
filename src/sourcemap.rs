//! Relocation of trailing source-map references for inlined artifacts.
//!
//! Once a script or stylesheet is copied into the HTML document, a relative
//! `sourceMappingURL` would be resolved against the document instead of the artifact's own
//! location. The relocator rewrites such URLs into paths resolvable from the site root.

use std::ops::Range;

use regex::Regex;

use crate::asset_paths::{relative_posix, should_skip_source_map_url, to_slash};
use crate::project::BuildContext;

/// Source-map URL found inside artifact content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapReference<'a> {
  /// URL exactly as written in the content.
  pub url: &'a str,
  /// Byte range of `url` within the content.
  pub range: Range<usize>,
}

/// Strategy for finding the source-map URL a relocation should rewrite.
pub trait SourceMapLocator {
  /// Locate the rewritable source-map URL in `content`, if any.
  fn locate<'a>(&self, content: &'a str) -> Option<SourceMapReference<'a>>;
}

/// Locates the conventional trailing comment appended by build tools.
///
/// Recognises `//# sourceMappingURL=<url>` and `/*# sourceMappingURL=<url> */` (including the
/// legacy `@` marker). Only the last reference counts, and only when nothing but whitespace and
/// an optional `*/` follows the URL up to the end of the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingCommentLocator;

fn comment_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r#"(?:/\*(?:\s*\r?\n(?://)?)?(?:[#@] sourceMappingURL=([^\s'"]*))\s*\*/|//(?:[#@] sourceMappingURL=([^\s'"]*)))\s*"#,
    )
    .expect("invalid sourceMappingURL regex")
  })
}

fn trailing_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^\s*(?:\*/)?\s*$").expect("invalid trailing comment regex"))
}

impl SourceMapLocator for TrailingCommentLocator {
  fn locate<'a>(&self, content: &'a str) -> Option<SourceMapReference<'a>> {
    let captures = comment_pattern().captures_iter(content).last()?;
    let url = captures.get(1).or_else(|| captures.get(2))?;
    if url.as_str().is_empty() || !trailing_pattern().is_match(&content[url.end()..]) {
      return None;
    }

    Some(SourceMapReference {
      url: url.as_str(),
      range: url.range(),
    })
  }
}

/// Rewrites source-map URLs of artifacts being moved into the HTML document.
#[derive(Debug, Clone, Default)]
pub struct SourceMapRelocator<L = TrailingCommentLocator> {
  locator: L,
}

impl SourceMapRelocator {
  /// Relocator using the trailing comment convention.
  pub fn new() -> Self {
    Self::default()
  }
}

impl<L: SourceMapLocator> SourceMapRelocator<L> {
  /// Relocator using a custom comment-locating strategy.
  pub fn with_locator(locator: L) -> Self {
    Self { locator }
  }

  /// Rewrite the source-map URL of the artifact stored as `asset_key`.
  ///
  /// The URL is taken relative to the artifact's own location inside the output directory,
  /// re-expressed relative to the output root and prefixed with the public path. Content
  /// without a reference, or whose URL is empty, embedded or already absolute, is returned
  /// unchanged.
  pub fn relocate(&self, content: &str, asset_key: &str, context: &BuildContext) -> String {
    let Some(reference) = self.locator.locate(content) else {
      return content.to_string();
    };
    if should_skip_source_map_url(reference.url) {
      tracing::debug!(asset = asset_key, url = reference.url, "Source map URL left as is");
      return content.to_string();
    }

    let corrected = relocated_url(reference.url, asset_key, context);
    tracing::debug!(
      asset = asset_key,
      from = reference.url,
      to = %corrected,
      "Relocated source map URL"
    );

    let mut output = String::with_capacity(content.len() + corrected.len());
    output.push_str(&content[..reference.range.start]);
    output.push_str(&corrected);
    output.push_str(&content[reference.range.end..]);
    output
  }
}

fn relocated_url(url: &str, asset_key: &str, context: &BuildContext) -> String {
  // Keys are output-root relative even when written with a leading separator.
  let asset_path = context.output_dir.join(asset_key.trim_start_matches(['/', '\\']));
  let asset_dir = asset_path.parent().unwrap_or(context.output_dir.as_path());
  let map_path = to_slash(&asset_dir.join(url));

  let map_relative = relative_posix(&map_path, &to_slash(&context.output_dir)).unwrap_or(map_path);
  context.public_path.join(&map_relative)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn context(public_path: Option<&str>) -> BuildContext {
    BuildContext::new("/out", public_path, "index.html")
  }

  #[test]
  fn rewrites_script_source_map_relative_to_public_path() {
    let relocator = SourceMapRelocator::new();
    let content = "console.log(1);\n//# sourceMappingURL=app.js.map";

    let result = relocator.relocate(content, "bin/app.js", &context(Some("/assets")));
    assert_eq!(
      result,
      "console.log(1);\n//# sourceMappingURL=/assets/bin/app.js.map"
    );
  }

  #[test]
  fn preserves_stylesheet_comment_terminator_and_whitespace() {
    let relocator = SourceMapRelocator::new();
    let content = "body{}\n/*# sourceMappingURL=style.css.map */\n";

    let result = relocator.relocate(content, "style.css", &context(Some("/assets")));
    assert_eq!(result, "body{}\n/*# sourceMappingURL=/assets/style.css.map */\n");
  }

  #[test]
  fn resolves_parent_segments_against_artifact_directory() {
    let relocator = SourceMapRelocator::new();
    let content = "x\n//# sourceMappingURL=../maps/app.js.map";

    let result = relocator.relocate(content, "js/app.js", &context(None));
    assert_eq!(result, "x\n//# sourceMappingURL=maps/app.js.map");
  }

  #[test]
  fn leaves_embedded_absolute_and_missing_urls_untouched() {
    let relocator = SourceMapRelocator::new();
    let ctx = context(Some("/assets"));

    for content in [
      "a\n//# sourceMappingURL=data:application/json;base64,e30=",
      "a\n//# sourceMappingURL=/maps/app.js.map",
      "a\n//# sourceMappingURL=",
      "console.log('no map')",
    ] {
      assert_eq!(relocator.relocate(content, "app.js", &ctx), content);
    }
  }

  #[test]
  fn relocation_is_idempotent_with_a_public_path() {
    let relocator = SourceMapRelocator::new();
    let ctx = context(Some("/assets"));
    let once = relocator.relocate("a\n//# sourceMappingURL=app.js.map\n", "app.js", &ctx);
    let twice = relocator.relocate(&once, "app.js", &ctx);
    assert_eq!(once, twice);
  }

  #[test]
  fn root_prefixed_keys_stay_inside_the_output_directory() {
    let relocator = SourceMapRelocator::new();
    let content = "a\n//# sourceMappingURL=app.js.map";

    let result = relocator.relocate(content, "/bin/app.js", &context(None));
    assert_eq!(result, "a\n//# sourceMappingURL=bin/app.js.map");

    let prefixed = relocator.relocate(content, "/bin/app.js", &context(Some("/assets")));
    assert_eq!(prefixed, "a\n//# sourceMappingURL=/assets/bin/app.js.map");
  }

  #[test]
  fn ignores_references_that_are_not_trailing() {
    let relocator = SourceMapRelocator::new();
    let content = "//# sourceMappingURL=app.js.map\nconsole.log(1);";

    assert_eq!(relocator.relocate(content, "app.js", &context(None)), content);
  }

  #[test]
  fn only_rewrites_the_trailing_occurrence() {
    let relocator = SourceMapRelocator::new();
    let content = "var s = 'app.js.map';\n//# sourceMappingURL=app.js.map";

    let result = relocator.relocate(content, "bin/app.js", &context(None));
    assert_eq!(
      result,
      "var s = 'app.js.map';\n//# sourceMappingURL=bin/app.js.map"
    );
  }

  #[test]
  fn locates_legacy_and_multiline_comments() {
    let locator = TrailingCommentLocator;
    let legacy = locator.locate("x\n//@ sourceMappingURL=old.js.map").unwrap();
    assert_eq!(legacy.url, "old.js.map");

    let multiline = locator
      .locate("body{}\n/*\n# sourceMappingURL=style.css.map\n*/")
      .unwrap();
    assert_eq!(multiline.url, "style.css.map");
  }

  struct FirstLineLocator;

  impl SourceMapLocator for FirstLineLocator {
    fn locate<'a>(&self, content: &'a str) -> Option<SourceMapReference<'a>> {
      let url = content.lines().next()?.strip_prefix("map:")?;
      Some(SourceMapReference {
        url,
        range: 4..4 + url.len(),
      })
    }
  }

  #[test]
  fn accepts_alternative_locators() {
    let relocator = SourceMapRelocator::with_locator(FirstLineLocator);
    let result = relocator.relocate("map:app.js.map\ncode", "bin/app.js", &context(None));
    assert_eq!(result, "map:bin/app.js.map\ncode");
  }
}
