use regex::Regex;

fn source_map_url_skips() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"^/").expect("invalid root-relative regex"),
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid absolute URL regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a source-map URL already resolves from the site root.
///
/// Embedded data URIs, root-relative paths and absolute URLs stay valid when their artifact is
/// inlined, so they are never rewritten.
pub fn should_skip_source_map_url(url: &str) -> bool {
  url.is_empty() || source_map_url_skips().iter().any(|pattern| pattern.is_match(url))
}
