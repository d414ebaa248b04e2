use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::constants::constants;
use crate::error::FetchError;

/// One server-hosted video, as returned by `GET /api/videos`.
///
/// The record is read-only from the client's perspective. The server emits
/// empty strings for unset optional fields, so the accessor methods normalize
/// empty and absent to `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoRecord {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub filename: String,
  /// Server-relative token used to build the stream URL. Opaque.
  pub path: String,
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub genre: String,
  #[serde(default)]
  pub release_year: i32,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub cover_image: String,
}

impl VideoRecord {
  pub fn genre(&self) -> Option<&str> {
    if self.genre.is_empty() { None } else { Some(&self.genre) }
  }

  pub fn description(&self) -> Option<&str> {
    if self.description.is_empty() { None } else { Some(&self.description) }
  }

  pub fn cover_image(&self) -> Option<&str> {
    if self.cover_image.is_empty() { None } else { Some(&self.cover_image) }
  }
}

/// One entry of the authoritative genre vocabulary from `GET /api/genres`,
/// independent of which genres currently appear among videos.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenreDescriptor {
  pub name: String,
}

/// Fetches the video and genre lists and caches the last successful catalog.
///
/// Reloads are raced by completion order: `begin_reload` hands out an
/// increasing generation, and `apply_videos` discards any result whose
/// generation is not newer than the last one applied. A fresh successful
/// load always supersedes the cache, even on identical data.
pub struct CatalogClient {
  http: Client,
  base: Url,
  videos: Vec<VideoRecord>,
  next_gen: u64,
  applied_gen: u64,
}

impl CatalogClient {
  pub fn new(base: Url) -> Self {
    Self { http: Client::new(), base, videos: Vec::new(), next_gen: 0, applied_gen: 0 }
  }

  pub fn http(&self) -> Client {
    self.http.clone()
  }

  pub fn base(&self) -> &Url {
    &self.base
  }

  /// Start a reload, returning the generation to pass back to `apply_videos`
  /// when the fetch completes.
  pub fn begin_reload(&mut self) -> u64 {
    self.next_gen += 1;
    self.next_gen
  }

  /// Install a fetched video list. Returns false (and changes nothing) when a
  /// later-started reload has already completed.
  pub fn apply_videos(&mut self, r#gen: u64, videos: Vec<VideoRecord>) -> bool {
    if r#gen <= self.applied_gen {
      debug!(gen = r#gen, applied = self.applied_gen, "discarding stale catalog reload");
      return false;
    }
    self.applied_gen = r#gen;
    self.videos = videos;
    true
  }

  /// The last successfully loaded catalog.
  pub fn catalog(&self) -> &[VideoRecord] {
    &self.videos
  }

  /// Look up a video by id in the cached catalog, for rendering detail views
  /// without re-fetching.
  pub fn video(&self, id: i64) -> Option<&VideoRecord> {
    self.videos.iter().find(|v| v.id == id)
  }
}

async fn get_json<T: DeserializeOwned>(http: &Client, base: &Url, path: &str) -> Result<T, FetchError> {
  let mut url = base.clone();
  url.set_path(path);
  let resp = http.get(url).send().await.map_err(FetchError::from_transport)?;
  let status = resp.status();
  if !status.is_success() {
    // The server may attach a JSON {message}; absence is fine.
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    return Err(FetchError::Api { status: status.as_u16(), message });
  }
  resp.json::<T>().await.map_err(FetchError::Network)
}

/// Fetch the ordered video list. No retry — the caller decides.
pub async fn load_videos(http: &Client, base: &Url) -> Result<Vec<VideoRecord>, FetchError> {
  get_json(http, base, &constants().videos_endpoint).await
}

/// Fetch the genre vocabulary. Same failure taxonomy as `load_videos`.
pub async fn load_genres(http: &Client, base: &Url) -> Result<Vec<GenreDescriptor>, FetchError> {
  get_json(http, base, &constants().genres_endpoint).await
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: i64, genre: &str, cover: &str) -> VideoRecord {
    VideoRecord {
      id,
      title: format!("Video {id}"),
      filename: format!("video-{id}.mp4"),
      path: format!("video-{id}.mp4"),
      size: 1024,
      genre: genre.to_string(),
      release_year: 0,
      description: String::new(),
      cover_image: cover.to_string(),
    }
  }

  // --- record normalization ---

  #[test]
  fn empty_optional_fields_normalize_to_none() {
    let v = record(1, "", "");
    assert_eq!(v.genre(), None);
    assert_eq!(v.cover_image(), None);
    assert_eq!(v.description(), None);
  }

  #[test]
  fn set_optional_fields_pass_through() {
    let v = record(1, "Drama", "poster.jpg");
    assert_eq!(v.genre(), Some("Drama"));
    assert_eq!(v.cover_image(), Some("poster.jpg"));
  }

  #[test]
  fn record_deserializes_with_absent_optionals() {
    let v: VideoRecord =
      serde_json::from_str(r#"{"id": 7, "title": "Clip", "path": "clip.mp4"}"#).expect("minimal record");
    assert_eq!(v.id, 7);
    assert_eq!(v.genre(), None);
    assert_eq!(v.release_year, 0);
    assert_eq!(v.size, 0);
  }

  // --- reload generations ---

  fn client() -> CatalogClient {
    CatalogClient::new(Url::parse("http://localhost:8080").unwrap())
  }

  #[test]
  fn later_generation_supersedes_earlier() {
    let mut c = client();
    let g1 = c.begin_reload();
    let g2 = c.begin_reload();
    assert!(c.apply_videos(g1, vec![record(1, "", "")]));
    assert!(c.apply_videos(g2, vec![record(2, "", "")]));
    assert_eq!(c.catalog().len(), 1);
    assert_eq!(c.catalog()[0].id, 2);
  }

  #[test]
  fn stale_completion_is_discarded() {
    let mut c = client();
    let g1 = c.begin_reload();
    let g2 = c.begin_reload();
    // The second reload completes first; the first must then be dropped.
    assert!(c.apply_videos(g2, vec![record(2, "", "")]));
    assert!(!c.apply_videos(g1, vec![record(1, "", "")]));
    assert_eq!(c.catalog()[0].id, 2);
  }

  #[test]
  fn identical_data_still_supersedes() {
    let mut c = client();
    let g1 = c.begin_reload();
    assert!(c.apply_videos(g1, vec![record(1, "", "")]));
    let g2 = c.begin_reload();
    assert!(c.apply_videos(g2, vec![record(1, "", "")]));
  }

  #[test]
  fn lookup_by_id_uses_cache() {
    let mut c = client();
    let g = c.begin_reload();
    c.apply_videos(g, vec![record(1, "", ""), record(5, "Drama", "")]);
    assert_eq!(c.video(5).map(|v| v.genre()), Some(Some("Drama")));
    assert!(c.video(9).is_none());
  }
}
