//! Helpers for turning tag references into artifact names and keeping source-map URLs valid.
//!
//! Each concern lives in a focused submodule so that reference normalisation, path cleaning and
//! source-map URL filtering can be tested independently of the tag resolver.

mod filters;
mod keys;
mod normalise;

pub use filters::should_skip_source_map_url;
pub use keys::{artifact_key, prefix_relative_key, strip_query};
pub use normalise::{clean_posix, relative_posix, to_slash};
