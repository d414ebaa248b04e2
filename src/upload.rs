//! Upload sessions: validate a chosen file, send one multipart request, and
//! report progress and the terminal outcome through a channel the event loop
//! drains. A session is single-shot — `submit` consumes it, and a retry
//! means building a new session with `select`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Body, Client, multipart};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use crate::constants::constants;
use crate::error::{UploadError, ValidationError};

/// Lifecycle of the upload form, tracked by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
  #[default]
  Idle,
  Validating,
  Sending,
  Succeeded(String),
  Failed(String),
}

/// The user's current selections on the upload form. The text fields are
/// opaque to this module and travel as-is in the multipart body.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
  pub file: Option<PathBuf>,
  pub cover: Option<PathBuf>,
  pub title: String,
  pub genre: String,
  pub description: String,
  pub year: String,
}

/// Progress and outcome events emitted while a submission is in flight.
#[derive(Debug)]
pub enum UploadEvent {
  /// Monotonically non-decreasing percent of bytes sent.
  Progress(u8),
  /// Terminal outcome: the server's success message, or the failure.
  Done(Result<String, UploadError>),
}

/// Guess a media type from the file name's extension.
pub fn media_type_for(name: &str) -> Option<&'static str> {
  let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
  constants().media_types_by_extension.iter().find(|(e, _)| *e == ext).map(|(_, t)| t.as_str())
}

/// Validate an upload selection. Rules in order, first failure wins: a
/// primary file must be present, and its declared media type (or the type
/// guessed from its name) must be in the accepted set — except that a `.ts`
/// name passes even with an unrecognized type, as a type-detection fallback.
/// Cover files are not validated client-side.
pub fn validate(file_name: Option<&str>, declared_type: Option<&str>) -> Result<(), ValidationError> {
  let Some(name) = file_name else {
    return Err(ValidationError::MissingFile);
  };
  let media_type = declared_type.or_else(|| media_type_for(name));
  let accepted = media_type.is_some_and(|t| constants().accepted_video_types.iter().any(|a| a == t));
  if accepted || name.to_lowercase().ends_with(&constants().ts_fallback_extension) {
    Ok(())
  } else {
    Err(ValidationError::UnsupportedType)
  }
}

/// A validated, ready-to-send upload. Owns its inputs for the session.
#[derive(Debug)]
pub struct UploadSession {
  file: PathBuf,
  cover: Option<PathBuf>,
  title: String,
  genre: String,
  description: String,
  year: String,
}

fn file_name_of(path: &Path) -> String {
  path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string()
}

/// Build a session from the form, validating the primary file. An empty
/// title defaults to the file name with its extension stripped.
pub fn select(form: &UploadForm) -> Result<UploadSession, ValidationError> {
  let file = form.file.clone().ok_or(ValidationError::MissingFile)?;
  let name = file_name_of(&file);
  validate(Some(&name), None)?;

  let title = if form.title.trim().is_empty() {
    name.rsplit_once('.').map(|(stem, _)| stem.to_string()).unwrap_or(name)
  } else {
    form.title.clone()
  };

  Ok(UploadSession {
    file,
    cover: form.cover.clone(),
    title,
    genre: form.genre.clone(),
    description: form.description.clone(),
    year: form.year.clone(),
  })
}

/// Byte counter shared by the upload part streams. Percentages are derived
/// from a monotonically growing counter, so they never go backwards.
#[derive(Clone)]
struct Progress {
  sent: Arc<AtomicU64>,
  reported: Arc<AtomicU64>,
  total: u64,
  tx: mpsc::UnboundedSender<UploadEvent>,
}

impl Progress {
  fn new(total: u64, tx: mpsc::UnboundedSender<UploadEvent>) -> Self {
    Self { sent: Arc::new(AtomicU64::new(0)), reported: Arc::new(AtomicU64::new(0)), total, tx }
  }

  fn add(&self, n: u64) {
    let sent = self.sent.fetch_add(n, Ordering::Relaxed) + n;
    if self.total == 0 {
      // Length not computable; emit no percentages at all.
      return;
    }
    let percent = (((sent.min(self.total)) as f64 / self.total as f64) * 100.0).round() as u64;
    let prev = self.reported.fetch_max(percent, Ordering::Relaxed);
    if percent > prev {
      let _ = self.tx.send(UploadEvent::Progress(percent as u8));
    }
  }
}

/// Wrap an open file in a chunked stream that feeds the progress counter as
/// bytes are handed to the transport.
fn counting_stream(
  file: tokio::fs::File,
  progress: Progress,
) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
  futures::stream::unfold((file, progress), |(mut file, progress)| async move {
    let mut buf = vec![0u8; constants().upload_chunk_bytes];
    match file.read(&mut buf).await {
      Ok(0) => None,
      Ok(n) => {
        buf.truncate(n);
        progress.add(n as u64);
        Some((Ok(buf), (file, progress)))
      }
      Err(e) => Some((Err(e), (file, progress))),
    }
  })
}

impl UploadSession {
  /// Send the multipart request, emitting `Progress` events along the way
  /// and exactly one `Done` at the end. Consumes the session; there is no
  /// automatic retry.
  pub async fn submit(self, http: Client, base: Url, events: mpsc::UnboundedSender<UploadEvent>) {
    let outcome = self.send(http, base, events.clone()).await;
    match &outcome {
      Ok(message) => info!(message = %message, "upload succeeded"),
      Err(e) => warn!(err = %e, "upload failed"),
    }
    let _ = events.send(UploadEvent::Done(outcome));
  }

  async fn send(
    self,
    http: Client,
    base: Url,
    events: mpsc::UnboundedSender<UploadEvent>,
  ) -> Result<String, UploadError> {
    let file_err = |path: &Path| {
      let path = path.display().to_string();
      move |source| UploadError::File { path: path.clone(), source }
    };

    let file_len = tokio::fs::metadata(&self.file).await.map_err(file_err(&self.file))?.len();
    let cover_len = match &self.cover {
      Some(cover) => tokio::fs::metadata(cover).await.map_err(file_err(cover))?.len(),
      None => 0,
    };
    let progress = Progress::new(file_len + cover_len, events);

    let file_name = file_name_of(&self.file);
    let file = tokio::fs::File::open(&self.file).await.map_err(file_err(&self.file))?;
    let file_part = multipart::Part::stream_with_length(Body::wrap_stream(counting_stream(file, progress.clone())), file_len)
      .file_name(file_name.clone())
      .mime_str(media_type_for(&file_name).unwrap_or("application/octet-stream"))
      .map_err(UploadError::Network)?;

    let mut form = multipart::Form::new()
      .text("title", self.title)
      .text("genre", self.genre)
      .text("description", self.description)
      .text("release_year", self.year)
      .part("file", file_part);

    if let Some(cover) = &self.cover {
      let cover_name = file_name_of(cover);
      let handle = tokio::fs::File::open(cover).await.map_err(file_err(cover))?;
      let cover_part =
        multipart::Part::stream_with_length(Body::wrap_stream(counting_stream(handle, progress.clone())), cover_len)
          .file_name(cover_name);
      form = form.part("cover_image", cover_part);
    }

    let mut url = base;
    url.set_path(&constants().upload_endpoint);
    info!(file = %self.file.display(), bytes = file_len, "starting upload");

    let resp = http.post(url).multipart(form).send().await.map_err(UploadError::Network)?;
    let status = resp.status();
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    if status.is_success() {
      Ok(message.unwrap_or_else(|| "Upload complete".to_string()))
    } else {
      Err(UploadError::Api { status: status.as_u16(), message })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- validate ---

  #[test]
  fn missing_file_is_first_failure() {
    assert_eq!(validate(None, Some("video/mp4")), Err(ValidationError::MissingFile));
  }

  #[test]
  fn accepted_container_types_pass() {
    assert_eq!(validate(Some("clip.mp4"), None), Ok(()));
    assert_eq!(validate(Some("clip.webm"), None), Ok(()));
    assert_eq!(validate(Some("clip.mov"), None), Ok(()));
    assert_eq!(validate(Some("clip.avi"), None), Ok(()));
  }

  #[test]
  fn declared_type_overrides_the_extension() {
    // A .mov name with a text/plain declared type is rejected.
    assert_eq!(validate(Some("clip.mov"), Some("text/plain")), Err(ValidationError::UnsupportedType));
  }

  #[test]
  fn ts_extension_passes_despite_unrecognized_type() {
    assert_eq!(validate(Some("clip.ts"), Some("application/octet-stream")), Ok(()));
    assert_eq!(validate(Some("CLIP.TS"), Some("application/octet-stream")), Ok(()));
  }

  #[test]
  fn unaccepted_video_container_is_rejected() {
    // mkv guesses video/x-matroska, which is not in the accepted set.
    assert_eq!(validate(Some("clip.mkv"), None), Err(ValidationError::UnsupportedType));
    assert_eq!(validate(Some("notes.txt"), None), Err(ValidationError::UnsupportedType));
    assert_eq!(validate(Some("noextension"), None), Err(ValidationError::UnsupportedType));
  }

  // --- media_type_for ---

  #[test]
  fn media_type_guessing_is_case_insensitive() {
    assert_eq!(media_type_for("CLIP.MP4"), Some("video/mp4"));
    assert_eq!(media_type_for("clip.ts"), Some("video/mp2t"));
    assert_eq!(media_type_for("clip"), None);
  }

  // --- select ---

  fn form_with(file: &str, title: &str) -> UploadForm {
    UploadForm { file: Some(PathBuf::from(file)), title: title.to_string(), ..UploadForm::default() }
  }

  #[test]
  fn select_requires_a_file() {
    assert!(matches!(select(&UploadForm::default()), Err(ValidationError::MissingFile)));
  }

  #[test]
  fn select_rejects_unsupported_files() {
    assert!(matches!(select(&form_with("/tmp/notes.txt", "")), Err(ValidationError::UnsupportedType)));
  }

  #[test]
  fn empty_title_defaults_to_file_stem() {
    let session = select(&form_with("/tmp/My Movie.mp4", "")).expect("valid selection");
    assert_eq!(session.title, "My Movie");
  }

  #[test]
  fn explicit_title_is_kept() {
    let session = select(&form_with("/tmp/clip.mp4", "A Title")).expect("valid selection");
    assert_eq!(session.title, "A Title");
  }

  // --- progress ---

  #[test]
  fn progress_percentages_never_decrease() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = Progress::new(1000, tx);
    for _ in 0..10 {
      progress.add(100);
    }
    let mut last = 0u8;
    let mut seen = 0;
    while let Ok(event) = rx.try_recv() {
      if let UploadEvent::Progress(p) = event {
        assert!(p >= last, "progress went backwards: {p} < {last}");
        last = p;
        seen += 1;
      }
    }
    assert!(seen > 0);
    assert_eq!(last, 100);
  }

  #[test]
  fn unknown_total_emits_no_percentages() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = Progress::new(0, tx);
    progress.add(4096);
    assert!(rx.try_recv().is_err());
  }
}
