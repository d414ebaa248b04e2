use thiserror::Error;

/// Failure of a catalog or genre fetch.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Transport-level failure — no response was received.
  #[error("network error: {0}")]
  Network(#[source] reqwest::Error),

  /// The server answered with a non-success status code.
  #[error("server returned {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
  Api { status: u16, message: Option<String> },
}

impl FetchError {
  /// Classify a reqwest error: a status error becomes `Api`, everything else
  /// (connect, timeout, body decode before a response) is `Network`.
  pub fn from_transport(err: reqwest::Error) -> Self {
    match err.status() {
      Some(status) => FetchError::Api { status: status.as_u16(), message: None },
      None => FetchError::Network(err),
    }
  }
}

/// Client-side rejection of an upload selection, before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please select a video file to upload")]
  MissingFile,

  #[error("Please select a valid video file")]
  UnsupportedType,
}

/// Terminal failure of an upload submission.
#[derive(Debug, Error)]
pub enum UploadError {
  #[error("Network error occurred")]
  Network(#[source] reqwest::Error),

  #[error("Upload failed: {}", message.as_deref().unwrap_or("server error"))]
  Api { status: u16, message: Option<String> },

  #[error("Could not read {path}: {source}")]
  File {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// The media engine refused to start or control playback.
/// Logged and non-fatal: the UI stays in the player view so the user can
/// retry or go back.
#[derive(Debug, Error)]
pub enum PlaybackError {
  #[error("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")]
  PlayerMissing,

  #[error("failed to control playback: {0}")]
  Io(#[from] std::io::Error),
}
