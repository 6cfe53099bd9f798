use std::path::Path;

/// Render a path with forward slashes regardless of the native separator.
pub fn to_slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// Lexically clean a slash-separated path.
///
/// `.` segments are dropped and `..` pops the previous segment. Leading `..` segments are
/// kept on relative paths and discarded at the root of absolute ones. An empty input, or one
/// that cleans down to `.`, yields an empty string.
pub fn clean_posix(path: &str) -> String {
  if path.is_empty() {
    return String::new();
  }

  let cleaned = to_slash(&path_clean::clean(path.replace('\\', "/")));
  if cleaned == "." { String::new() } else { cleaned }
}

/// Express `path` relative to `base`, both slash-separated.
///
/// Returns `None` when no lexical relation exists, such as a relative path measured against
/// an absolute base.
pub fn relative_posix(path: &str, base: &str) -> Option<String> {
  pathdiff::diff_paths(clean_posix(path), clean_posix(base)).map(|relative| to_slash(&relative))
}
