use crate::project::{BuildContext, PublicPath};

use super::normalise::{clean_posix, relative_posix};

/// Drop a cache-busting query string (everything from the first `?`).
pub fn strip_query(reference: &str) -> &str {
  reference
    .split_once('?')
    .map_or(reference, |(path, _)| path)
}

/// Express a path relative to the public-path prefix.
///
/// Without a prefix the cleaned path is returned unchanged. When the path cannot be expressed
/// relative to the prefix (one is absolute, the other is not) the cleaned path is kept so an
/// exact table lookup still has a chance to succeed.
pub fn prefix_relative_key(path: &str, public_path: &PublicPath) -> String {
  let cleaned = clean_posix(path);
  match public_path.prefix() {
    None => cleaned,
    Some(prefix) => relative_posix(&cleaned, prefix).unwrap_or(cleaned),
  }
}

/// Compute the output-root-relative artifact name a tag reference points at.
///
/// References are relative to the document's final location, so documents emitted into a
/// sub-directory get that directory prepended to relative references before the public-path
/// prefix is stripped.
pub fn artifact_key(reference: &str, context: &BuildContext) -> String {
  let path = strip_query(reference);
  let located = match context.document_dir() {
    Some(dir) if is_document_relative(path) => format!("{dir}/{path}"),
    _ => path.to_string(),
  };

  prefix_relative_key(&located, &context.public_path)
}

fn is_document_relative(path: &str) -> bool {
  !path.starts_with('/') && !path.contains("://")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_query_strings() {
    assert_eq!(strip_query("app.js?abc123"), "app.js");
    assert_eq!(strip_query("app.js?a=1?b=2"), "app.js");
    assert_eq!(strip_query("app.js"), "app.js");
  }

  #[test]
  fn query_strings_never_affect_keys() {
    let context = BuildContext::new("/out", None, "index.html");
    assert_eq!(
      artifact_key("app.js?abc123", &context),
      artifact_key("app.js", &context)
    );
  }

  #[test]
  fn prepends_document_directory() {
    let context = BuildContext::new("/out", None, "subfolder/index.html");
    assert_eq!(artifact_key("main.js", &context), "subfolder/main.js");
    assert_eq!(artifact_key("../main.js", &context), "main.js");
  }

  #[test]
  fn strips_public_path_prefix() {
    let context = BuildContext::new("/out", Some("/assets"), "index.html");
    assert_eq!(artifact_key("/assets/style.css", &context), "style.css");
    assert_eq!(artifact_key("/assets/bin/app.js?v=2", &context), "bin/app.js");
  }

  #[test]
  fn strips_url_public_path_prefix() {
    let context = BuildContext::new("/out", Some("https://cdn.example.com/"), "nested/index.html");
    assert_eq!(
      artifact_key("https://cdn.example.com/app.js", &context),
      "app.js"
    );
  }

  #[test]
  fn auto_public_path_behaves_like_no_prefix() {
    let context = BuildContext::new("/out", Some("auto"), "index.html");
    assert_eq!(artifact_key("main.js", &context), "main.js");
  }
}
