//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub default_server_url: String,

  // Server routes
  pub videos_endpoint: String,
  pub genres_endpoint: String,
  pub upload_endpoint: String,
  pub stream_prefix: String,
  pub covers_prefix: String,

  // Upload
  pub accepted_video_types: Vec<String>,
  pub ts_fallback_extension: String,
  pub media_types_by_extension: Vec<(String, String)>,
  pub upload_chunk_bytes: usize,

  // Covers
  pub default_covers: Vec<(String, String)>,
  pub placeholder_gradients: Vec<String>,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
