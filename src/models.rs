//! Tag records exchanged with the HTML template generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Marker stored in [`Tag::meta`] on every tag produced by the inlining pass.
pub const PLUGIN_MARKER: &str = "html-inline-source";

/// Structured representation of a single element the template generator will emit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
  /// Element name, for example `script` or `link`.
  pub tag_name: String,
  /// Attribute values keyed by attribute name.
  #[serde(default)]
  pub attributes: BTreeMap<String, String>,
  /// Literal text placed between the opening and closing tag.
  #[serde(default, rename = "innerHTML", skip_serializing_if = "Option::is_none")]
  pub inner_html: Option<String>,
  /// Whether a closing tag must be emitted.
  #[serde(default)]
  pub close_tag: bool,
  /// Free-form annotations attached by whichever step produced the tag.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub meta: BTreeMap<String, String>,
}

/// Classification of a tag for inlining purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind<'a> {
  /// External script carrying its reference in `src`.
  Script {
    /// Raw `src` value.
    src: &'a str,
  },
  /// Stylesheet link carrying its reference in `href`.
  Stylesheet {
    /// Raw `href` value.
    href: &'a str,
  },
  /// Anything else; never inlined.
  Other,
}

impl<'a> TagKind<'a> {
  /// Reference string the tag points at, if it is an inlining candidate.
  pub fn reference(self) -> Option<&'a str> {
    match self {
      Self::Script { src } => Some(src),
      Self::Stylesheet { href } => Some(href),
      Self::Other => None,
    }
  }
}

impl Tag {
  /// External script tag referencing `src`.
  pub fn script(src: impl Into<String>) -> Self {
    Self {
      tag_name: "script".into(),
      attributes: BTreeMap::from([("src".to_string(), src.into())]),
      inner_html: None,
      close_tag: true,
      meta: BTreeMap::new(),
    }
  }

  /// Stylesheet link tag referencing `href`.
  pub fn stylesheet(href: impl Into<String>) -> Self {
    Self {
      tag_name: "link".into(),
      attributes: BTreeMap::from([
        ("href".to_string(), href.into()),
        ("rel".to_string(), "stylesheet".to_string()),
      ]),
      inner_html: None,
      close_tag: false,
      meta: BTreeMap::new(),
    }
  }

  /// Inline `<script>` element holding `content` verbatim.
  pub fn inline_script(content: impl Into<String>) -> Self {
    Self::inline("script", "text/javascript", content.into())
  }

  /// Inline `<style>` element holding `content` verbatim.
  pub fn inline_style(content: impl Into<String>) -> Self {
    Self::inline("style", "text/css", content.into())
  }

  fn inline(tag_name: &str, mime: &str, content: String) -> Self {
    Self {
      tag_name: tag_name.into(),
      attributes: BTreeMap::from([("type".to_string(), mime.to_string())]),
      inner_html: Some(content),
      close_tag: true,
      meta: BTreeMap::from([("plugin".to_string(), PLUGIN_MARKER.to_string())]),
    }
  }

  /// Attribute value by name.
  pub fn attribute(&self, name: &str) -> Option<&str> {
    self.attributes.get(name).map(String::as_str)
  }

  /// Classify the tag. A `link` only counts as a stylesheet when its `rel` is absent or
  /// lists `stylesheet`, so preload hints are never turned into `<style>` elements.
  pub fn kind(&self) -> TagKind<'_> {
    match self.tag_name.as_str() {
      "script" => match self.attribute("src") {
        Some(src) => TagKind::Script { src },
        None => TagKind::Other,
      },
      "link" => {
        let is_stylesheet = self.attribute("rel").is_none_or(|rel| {
          rel
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        });
        match self.attribute("href") {
          Some(href) if is_stylesheet => TagKind::Stylesheet { href },
          _ => TagKind::Other,
        }
      }
      _ => TagKind::Other,
    }
  }
}

/// Group a tag is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
  /// Inside `<head>`.
  Head,
  /// At the end of `<body>`.
  Body,
}

/// Ordered tag groups for one generated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTags {
  /// Tags placed in the document head.
  #[serde(default)]
  pub head: Vec<Tag>,
  /// Tags placed in the document body.
  #[serde(default)]
  pub body: Vec<Tag>,
}

impl AssetTags {
  /// Mutable access to one of the groups.
  pub fn group_mut(&mut self, placement: Placement) -> &mut Vec<Tag> {
    match placement {
      Placement::Head => &mut self.head,
      Placement::Body => &mut self.body,
    }
  }

  /// Total number of tags across both groups.
  pub fn len(&self) -> usize {
    self.head.len() + self.body.len()
  }

  /// Returns `true` when neither group holds a tag.
  pub fn is_empty(&self) -> bool {
    self.head.is_empty() && self.body.is_empty()
  }
}
