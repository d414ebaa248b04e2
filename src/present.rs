//! Display-only derivations from a video record: cover art URL resolution,
//! human-readable sizes, display year. Pure functions, no side effects.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::api::VideoRecord;
use crate::constants::constants;

/// Percent-encoding set matching JavaScript's `encodeURIComponent`:
/// everything except alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

pub fn encode_component(s: &str) -> String {
  utf8_percent_encode(s, COMPONENT).to_string()
}

fn server_path(base: &Url, path: &str) -> String {
  let mut url = base.clone();
  url.set_path(path);
  url.to_string()
}

/// URL of the stream bytes for a video, built from its opaque `path` token.
pub fn stream_url(base: &Url, video: &VideoRecord) -> String {
  server_path(base, &format!("{}/{}", constants().stream_prefix, encode_component(&video.path)))
}

/// Resolve the cover art for a video, in fallback order: the uploaded cover
/// image, the genre's default cover, then an inline SVG placeholder whose
/// gradient is a stable hash of the title. Deterministic: the same record
/// always yields the same URL.
pub fn cover_url(base: &Url, video: &VideoRecord) -> String {
  if let Some(cover) = video.cover_image() {
    return server_path(base, &format!("{}/{}", constants().covers_prefix, encode_component(cover)));
  }

  if let Some(genre) = video.genre()
    && let Some((_, file)) = constants().default_covers.iter().find(|(g, _)| g.as_str() == genre)
  {
    return server_path(base, &format!("{}/defaults/{}", constants().covers_prefix, file));
  }

  let palette = &constants().placeholder_gradients;
  let hash: u64 = video.title.chars().map(|c| c as u64).sum();
  let gradient = &palette[(hash % palette.len() as u64) as usize];
  format!(
    "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='100' height='100' viewBox='0 0 100 100'%3E%3Crect width='100' height='100' fill='{}'/%3E%3C/svg%3E",
    encode_component(gradient)
  )
}

/// Render a byte count with the largest unit keeping the value below 1024,
/// rounded to the nearest whole number.
pub fn formatted_size(bytes: u64) -> String {
  const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
  if bytes == 0 {
    return "0 B".to_string();
  }
  let exp = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
  let value = (bytes as f64 / 1024_f64.powi(exp as i32)).round();
  format!("{} {}", value, UNITS[exp])
}

/// The release year when known (`> 0`). How to render the unknown case is
/// the caller's choice.
pub fn display_year(video: &VideoRecord) -> Option<i32> {
  if video.release_year > 0 { Some(video.release_year) } else { None }
}

/// One-line blurb for a promoted video: its description, or the filename
/// with its size when no description was written.
pub fn summary_line(video: &VideoRecord) -> String {
  match video.description() {
    Some(description) => description.to_string(),
    None => format!("{} - {}", video.filename, formatted_size(video.size)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base() -> Url {
    Url::parse("http://localhost:8080").unwrap()
  }

  fn video(title: &str, genre: &str, cover: &str) -> VideoRecord {
    VideoRecord {
      id: 1,
      title: title.to_string(),
      filename: "clip.mp4".to_string(),
      path: "clip file.mp4".to_string(),
      size: 0,
      genre: genre.to_string(),
      release_year: 0,
      description: String::new(),
      cover_image: cover.to_string(),
    }
  }

  // --- formatted_size ---

  #[test]
  fn zero_bytes_is_exactly_zero_b() {
    assert_eq!(formatted_size(0), "0 B");
  }

  #[test]
  fn scales_to_largest_unit_below_1024() {
    assert_eq!(formatted_size(1), "1 B");
    assert_eq!(formatted_size(1023), "1023 B");
    assert_eq!(formatted_size(1024), "1 KB");
    assert_eq!(formatted_size(1024 * 1024), "1 MB");
    assert_eq!(formatted_size(3 * 1024 * 1024 * 1024), "3 GB");
    assert_eq!(formatted_size(2 * 1024 * 1024 * 1024 * 1024), "2 TB");
  }

  #[test]
  fn rounds_to_nearest_not_truncates() {
    assert_eq!(formatted_size(1536), "2 KB");
    assert_eq!(formatted_size(1434), "1 KB");
  }

  // --- cover_url ---

  #[test]
  fn uploaded_cover_wins_and_is_percent_encoded() {
    let v = video("Clip", "Action", "my poster.jpg");
    assert_eq!(cover_url(&base(), &v), "http://localhost:8080/covers/my%20poster.jpg");
  }

  #[test]
  fn genre_default_cover_used_without_uploaded_cover() {
    let v = video("Clip", "Action", "");
    let url = cover_url(&base(), &v);
    assert_eq!(url, "http://localhost:8080/covers/defaults/action-default.jpg");
    // Deterministic: an identical record yields the identical URL.
    assert_eq!(cover_url(&base(), &v), url);
  }

  #[test]
  fn unknown_genre_falls_back_to_title_gradient() {
    let v = video("Some Title", "Western", "");
    let url = cover_url(&base(), &v);
    assert!(url.starts_with("data:image/svg+xml,"));
    assert_eq!(cover_url(&base(), &v), url);
  }

  #[test]
  fn gradient_choice_is_a_stable_title_hash() {
    let a = cover_url(&base(), &video("AAAA", "", ""));
    let b = cover_url(&base(), &video("AAAB", "", ""));
    assert_eq!(a, cover_url(&base(), &video("AAAA", "", "")));
    // Adjacent char codes land on adjacent palette entries.
    assert_ne!(a, b);
  }

  // --- stream_url ---

  #[test]
  fn stream_url_encodes_the_path_token() {
    let v = video("Clip", "", "");
    assert_eq!(stream_url(&base(), &v), "http://localhost:8080/videos/clip%20file.mp4");
  }

  // --- summary_line ---

  #[test]
  fn summary_prefers_the_description() {
    let mut v = video("Clip", "", "");
    v.description = "A short film.".to_string();
    assert_eq!(summary_line(&v), "A short film.");
  }

  #[test]
  fn summary_falls_back_to_filename_and_size() {
    let mut v = video("Clip", "", "");
    v.size = 1024;
    assert_eq!(summary_line(&v), "clip.mp4 - 1 KB");
  }

  // --- display_year ---

  #[test]
  fn year_zero_or_negative_means_unknown() {
    let mut v = video("Clip", "", "");
    assert_eq!(display_year(&v), None);
    v.release_year = 1997;
    assert_eq!(display_year(&v), Some(1997));
  }
}
