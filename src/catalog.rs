//! Derived browse groupings over the current catalog.
//!
//! Categories are recomputed wholesale from the video list on every reload,
//! never patched incrementally. Membership is decided by exact genre string
//! equality; the slug key exists only for lookups and element ids, and two
//! genre names differing only in whitespace will collide there. That
//! ambiguity is an accepted limitation carried over from the original UI —
//! grouping semantics must not change to paper over it.

use crate::api::VideoRecord;

pub const ALL_KEY: &str = "all";
pub const UNCATEGORIZED_KEY: &str = "uncategorized";

/// A named, ordered grouping of catalog indices for browsing.
///
/// `items` are indices into the video list `organize` was called with; the
/// order is the source list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
  /// Stable slug derived from the label (`all` and `uncategorized` reserved).
  pub key: String,
  pub label: String,
  pub items: Vec<usize>,
}

/// Slug for a genre name: lowercase, whitespace runs collapsed to one hyphen.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut in_whitespace = false;
  for c in name.chars() {
    if c.is_whitespace() {
      in_whitespace = true;
    } else {
      if in_whitespace && !slug.is_empty() {
        slug.push('-');
      }
      in_whitespace = false;
      for lower in c.to_lowercase() {
        slug.push(lower);
      }
    }
  }
  slug
}

/// Partition a video list into ordered categories: `all` first
/// (unconditionally, even when empty), then one category per distinct
/// non-empty genre in order of first appearance, then `uncategorized` iff at
/// least one video has no genre.
pub fn organize(videos: &[VideoRecord]) -> Vec<Category> {
  let mut categories =
    vec![Category { key: ALL_KEY.to_string(), label: "All Videos".to_string(), items: (0..videos.len()).collect() }];

  let mut genres: Vec<&str> = Vec::new();
  for video in videos {
    if let Some(genre) = video.genre()
      && !genres.contains(&genre)
    {
      genres.push(genre);
    }
  }

  for genre in genres {
    let items: Vec<usize> = videos.iter().enumerate().filter(|(_, v)| v.genre() == Some(genre)).map(|(i, _)| i).collect();
    categories.push(Category { key: slugify(genre), label: genre.to_string(), items });
  }

  let ungenred: Vec<usize> = videos.iter().enumerate().filter(|(_, v)| v.genre().is_none()).map(|(i, _)| i).collect();
  if !ungenred.is_empty() {
    categories.push(Category {
      key: UNCATEGORIZED_KEY.to_string(),
      label: "Uncategorized".to_string(),
      items: ungenred,
    });
  }

  categories
}

/// Pick the item promoted to the featured banner: the first video with a
/// cover image, else the first video, else none. Always recomputed from the
/// full list, never from a category and never persisted across reloads.
pub fn select_featured(videos: &[VideoRecord]) -> Option<&VideoRecord> {
  videos.iter().find(|v| v.cover_image().is_some()).or_else(|| videos.first())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn video(id: i64, genre: &str, cover: &str) -> VideoRecord {
    VideoRecord {
      id,
      title: format!("Video {id}"),
      filename: format!("v{id}.mp4"),
      path: format!("v{id}.mp4"),
      size: 0,
      genre: genre.to_string(),
      release_year: 0,
      description: String::new(),
      cover_image: cover.to_string(),
    }
  }

  // --- slugify ---

  #[test]
  fn slugify_lowercases() {
    assert_eq!(slugify("Drama"), "drama");
    assert_eq!(slugify("Sci-Fi"), "sci-fi");
  }

  #[test]
  fn slugify_collapses_whitespace_runs() {
    assert_eq!(slugify("Film  Noir"), "film-noir");
    assert_eq!(slugify("Film Noir"), "film-noir");
    assert_eq!(slugify("  Film \t Noir  "), "film-noir");
  }

  #[test]
  fn slug_collision_between_spacings_is_expected() {
    // Documented limitation: differently-spaced names share a key.
    assert_eq!(slugify("Film Noir"), slugify("Film  Noir"));
  }

  // --- organize ---

  #[test]
  fn all_category_holds_every_video_in_order() {
    let videos = vec![video(1, "Drama", ""), video(2, "", ""), video(3, "Action", "")];
    let categories = organize(&videos);
    assert_eq!(categories[0].key, ALL_KEY);
    assert_eq!(categories[0].items, vec![0, 1, 2]);
  }

  #[test]
  fn all_category_emitted_for_empty_catalog() {
    let categories = organize(&[]);
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].key, ALL_KEY);
    assert!(categories[0].items.is_empty());
  }

  #[test]
  fn one_category_per_distinct_genre_in_first_appearance_order() {
    let videos = vec![video(1, "Drama", ""), video(2, "Action", ""), video(3, "Drama", ""), video(4, "Comedy", "")];
    let categories = organize(&videos);
    let keys: Vec<&str> = categories.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["all", "drama", "action", "comedy"]);
    assert_eq!(categories[1].items, vec![0, 2]);
  }

  #[test]
  fn drama_video_appears_only_under_drama_and_all() {
    let videos = vec![video(1, "Drama", ""), video(2, "Action", "")];
    let categories = organize(&videos);
    for category in &categories {
      let contains = category.items.contains(&0);
      let allowed = category.key == "all" || category.key == "drama";
      assert_eq!(contains, allowed, "video 1 misplaced in {}", category.key);
    }
  }

  #[test]
  fn uncategorized_present_iff_ungenred_videos_exist() {
    let with = organize(&[video(1, "Drama", ""), video(2, "", "")]);
    assert_eq!(with.last().map(|c| c.key.as_str()), Some(UNCATEGORIZED_KEY));
    assert_eq!(with.last().unwrap().items, vec![1]);

    let without = organize(&[video(1, "Drama", "")]);
    assert!(without.iter().all(|c| c.key != UNCATEGORIZED_KEY));
  }

  #[test]
  fn membership_is_exact_genre_equality_despite_shared_slug() {
    let videos = vec![video(1, "Film Noir", ""), video(2, "Film  Noir", "")];
    let categories = organize(&videos);
    // Both spellings produce their own category; the keys collide.
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[1].key, categories[2].key);
    assert_eq!(categories[1].items, vec![0]);
    assert_eq!(categories[2].items, vec![1]);
  }

  // --- select_featured ---

  #[test]
  fn featured_of_empty_list_is_none() {
    assert!(select_featured(&[]).is_none());
  }

  #[test]
  fn featured_prefers_first_video_with_cover() {
    let videos = vec![video(1, "Drama", ""), video(2, "", ""), video(3, "Action", "poster.jpg")];
    assert_eq!(select_featured(&videos).map(|v| v.id), Some(3));
  }

  #[test]
  fn featured_falls_back_to_first_video() {
    let videos = vec![video(4, "", ""), video(5, "", "")];
    assert_eq!(select_featured(&videos).map(|v| v.id), Some(4));
  }
}
