#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod artifacts;
pub mod asset_paths;
pub mod config;
pub mod error;
pub mod models;
pub mod project;
pub mod resolver;
pub mod sourcemap;

pub use artifacts::{Artifact, ArtifactIndex, ArtifactTable, FileArtifact};
pub use config::{InlineConfig, MatchingRule, MissingAssetPolicy};
pub use error::{InlineError, InlineResult};
pub use models::{AssetTags, Placement, Tag, TagKind};
pub use project::{BuildContext, PublicPath};
pub use resolver::{InlineSource, Resolution, TagResolver};
pub use sourcemap::{SourceMapLocator, SourceMapRelocator, TrailingCommentLocator};
