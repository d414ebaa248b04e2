use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use url::Url;

use crate::api::{self, CatalogClient, GenreDescriptor, VideoRecord};
use crate::catalog::{self, Category};
use crate::config::Config;
use crate::error::FetchError;
use crate::player::{NowPlaying, VideoPlayer};
use crate::present;
use crate::theme::{THEMES, theme_index_by_name};
use crate::upload::{self, UploadEvent, UploadForm, UploadStatus};
use crate::view::{PlayerCommand, ViewInput, ViewState, transition};

// --- Types ---

pub type VideosResult = (u64, Result<Vec<VideoRecord>, FetchError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Videos,
  Upload,
}

/// Which pane of the browse screen has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsePane {
  Categories,
  Videos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
  File,
  Cover,
  Title,
  Genre,
  Description,
  Year,
}

impl UploadField {
  pub const ALL: [UploadField; 6] =
    [UploadField::File, UploadField::Cover, UploadField::Title, UploadField::Genre, UploadField::Description, UploadField::Year];

  pub fn label(self) -> &'static str {
    match self {
      UploadField::File => "Video file",
      UploadField::Cover => "Cover image",
      UploadField::Title => "Title",
      UploadField::Genre => "Genre",
      UploadField::Description => "Description",
      UploadField::Year => "Release year",
    }
  }
}

/// Text being edited on the upload tab. Paths are typed as plain strings and
/// only become `PathBuf`s when a submission is built.
#[derive(Default)]
pub struct UploadDraft {
  pub file: String,
  pub cover: String,
  pub title: String,
  pub genre: String,
  pub description: String,
  pub year: String,
}

impl UploadDraft {
  pub fn field(&self, field: UploadField) -> &String {
    match field {
      UploadField::File => &self.file,
      UploadField::Cover => &self.cover,
      UploadField::Title => &self.title,
      UploadField::Genre => &self.genre,
      UploadField::Description => &self.description,
      UploadField::Year => &self.year,
    }
  }

  pub fn field_mut(&mut self, field: UploadField) -> &mut String {
    match field {
      UploadField::File => &mut self.file,
      UploadField::Cover => &mut self.cover,
      UploadField::Title => &mut self.title,
      UploadField::Genre => &mut self.genre,
      UploadField::Description => &mut self.description,
      UploadField::Year => &mut self.year,
    }
  }

  fn to_form(&self) -> UploadForm {
    let path = |s: &str| {
      let s = s.trim();
      if s.is_empty() { None } else { Some(PathBuf::from(s)) }
    };
    UploadForm {
      file: path(&self.file),
      cover: path(&self.cover),
      title: self.title.clone(),
      genre: self.genre.clone(),
      description: self.description.clone(),
      year: self.year.trim().to_string(),
    }
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// In-flight async task receivers.
pub(crate) struct AsyncTasks {
  pub(crate) videos_tx: mpsc::UnboundedSender<VideosResult>,
  pub(crate) videos_rx: mpsc::UnboundedReceiver<VideosResult>,
  pub(crate) genres_rx: Option<oneshot::Receiver<Result<Vec<GenreDescriptor>, FetchError>>>,
  pub(crate) upload_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
}

impl Default for AsyncTasks {
  fn default() -> Self {
    let (videos_tx, videos_rx) = mpsc::unbounded_channel();
    Self { videos_tx, videos_rx, genres_rx: None, upload_rx: None }
  }
}

pub struct App {
  pub tab: Tab,
  pub view: ViewState,
  pub client: CatalogClient,
  /// Authoritative genre vocabulary, shown as a hint on the upload form.
  pub genres: Vec<GenreDescriptor>,
  pub categories: Vec<Category>,
  pub featured_id: Option<i64>,
  pub pane: BrowsePane,
  pub category_state: ListState,
  pub video_state: ListState,
  pub player: VideoPlayer,
  pub theme_index: usize,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  pub draft: UploadDraft,
  pub upload_field: UploadField,
  /// Cursor position within the active upload field (char index).
  pub field_cursor: usize,
  pub upload_status: UploadStatus,
  pub upload_progress: Option<u8>,
  /// `"name (size)"` for the chosen file, refreshed when the file field
  /// loses focus. Just the name when the path does not stat (yet).
  pub file_summary: Option<String>,
  /// Replaces the browse list while the catalog cannot be loaded.
  pub catalog_error: Option<String>,
  pub(crate) tasks: AsyncTasks,
  reloads_in_flight: usize,
  config: Config,
  /// When the last error was set — used for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(base: Url, config: Config) -> Self {
    let theme_index = config.theme_name.as_deref().and_then(theme_index_by_name).unwrap_or(0);

    let mut category_state = ListState::default();
    category_state.select(Some(0));

    Self {
      tab: Tab::Videos,
      view: ViewState::Browse,
      client: CatalogClient::new(base),
      genres: Vec::new(),
      categories: Vec::new(),
      featured_id: None,
      pane: BrowsePane::Videos,
      category_state,
      video_state: ListState::default(),
      player: VideoPlayer::new(),
      theme_index,
      last_error: None,
      status_message: None,
      should_quit: false,
      draft: UploadDraft::default(),
      upload_field: UploadField::File,
      field_cursor: 0,
      upload_status: UploadStatus::Idle,
      upload_progress: None,
      file_summary: None,
      catalog_error: None,
      tasks: AsyncTasks::default(),
      reloads_in_flight: 0,
      config,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  // --- Derived browse state ---

  /// Recompute categories and the featured pick from the cached catalog.
  /// Runs after every applied reload. The selected category is re-found by
  /// its slug key, not its position, so it survives genres appearing and
  /// disappearing around it; a key that vanished falls back to `all`. Keys
  /// can collide for differently-spaced genre names, in which case the first
  /// match wins.
  fn recompute(&mut self) {
    let selected_key =
      self.category_state.selected().and_then(|i| self.categories.get(i)).map(|c| c.key.clone());

    self.categories = catalog::organize(self.client.catalog());
    self.featured_id = catalog::select_featured(self.client.catalog()).map(|v| v.id);

    let sel = selected_key
      .and_then(|key| self.categories.iter().position(|c| c.key == key))
      .unwrap_or(0);
    self.category_state.select(Some(sel));
    let visible = self.visible_videos().len();
    match self.video_state.selected() {
      Some(_) if visible == 0 => self.video_state.select(None),
      Some(i) if i >= visible => self.video_state.select(Some(visible - 1)),
      None if visible > 0 => self.video_state.select(Some(0)),
      _ => {}
    }
  }

  /// Catalog indices of the videos in the selected category.
  pub fn visible_videos(&self) -> &[usize] {
    let sel = self.category_state.selected().unwrap_or(0);
    self.categories.get(sel).map(|c| c.items.as_slice()).unwrap_or(&[])
  }

  pub fn selected_video(&self) -> Option<&VideoRecord> {
    let idx = *self.visible_videos().get(self.video_state.selected()?)?;
    self.client.catalog().get(idx)
  }

  pub fn featured_video(&self) -> Option<&VideoRecord> {
    self.client.video(self.featured_id?)
  }

  // --- Async completions ---

  pub async fn check_pending(&mut self) {
    // Catalog reloads, raced by completion order.
    let mut reloads = Vec::new();
    while let Ok(completed) = self.tasks.videos_rx.try_recv() {
      reloads.push(completed);
    }
    for (r#gen, result) in reloads {
      self.reloads_in_flight = self.reloads_in_flight.saturating_sub(1);
      match result {
        Ok(videos) => {
          if self.client.apply_videos(r#gen, videos) {
            self.clear_error();
            self.catalog_error = None;
            self.recompute();
          }
        }
        Err(e) => {
          self.catalog_error = Some(format!("Failed to load videos: {}", e));
          self.set_error(format!("Failed to load videos: {}", e));
        }
      }
      if self.reloads_in_flight == 0 {
        self.status_message = None;
      }
    }

    // Genre vocabulary. A failure is logged and otherwise ignored — the
    // upload form degrades to free-text genre entry.
    if let Some(mut rx) = self.tasks.genres_rx.take() {
      match rx.try_recv() {
        Ok(Ok(genres)) => {
          info!(count = genres.len(), "genre vocabulary loaded");
          self.genres = genres;
        }
        Ok(Err(e)) => {
          warn!(err = %e, "failed to load genres");
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.genres_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          warn!("genre load task failed");
        }
      }
    }

    // Upload progress and outcome.
    if let Some(mut rx) = self.tasks.upload_rx.take() {
      let mut open = true;
      loop {
        match rx.try_recv() {
          Ok(UploadEvent::Progress(p)) => {
            self.upload_progress = Some(p);
          }
          Ok(UploadEvent::Done(Ok(message))) => {
            self.upload_status = UploadStatus::Succeeded(message);
            self.upload_progress = None;
            self.draft.reset();
            self.file_summary = None;
            self.field_cursor = 0;
            self.upload_field = UploadField::File;
            open = false;
            // A fresh upload should appear in the library right away.
            self.trigger_reload();
            break;
          }
          Ok(UploadEvent::Done(Err(e))) => {
            // The draft is kept so the user can fix and resubmit.
            self.upload_status = UploadStatus::Failed(e.to_string());
            self.upload_progress = None;
            open = false;
            break;
          }
          Err(mpsc::error::TryRecvError::Empty) => break,
          Err(mpsc::error::TryRecvError::Disconnected) => {
            open = false;
            break;
          }
        }
      }
      if open {
        self.tasks.upload_rx = Some(rx);
      }
    }
  }

  /// Re-stat the typed file path and rebuild the `"name (size)"` summary.
  /// A path that does not exist yet degrades to just the file name.
  pub fn refresh_file_summary(&mut self) {
    let path = self.draft.file.trim();
    if path.is_empty() {
      self.file_summary = None;
      return;
    }
    let name = Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path);
    self.file_summary = Some(match std::fs::metadata(path) {
      Ok(meta) => format!("{} ({})", name, present::formatted_size(meta.len())),
      Err(_) => name.to_string(),
    });
  }

  // --- Triggers ---

  pub fn trigger_reload(&mut self) {
    let r#gen = self.client.begin_reload();
    info!(gen = r#gen, "catalog reload triggered");
    self.status_message = Some("Loading library…".to_string());
    self.reloads_in_flight += 1;

    let http = self.client.http();
    let base = self.client.base().clone();
    let tx = self.tasks.videos_tx.clone();
    tokio::spawn(async move {
      let _ = tx.send((r#gen, api::load_videos(&http, &base).await));
    });
  }

  /// Fetch the genre vocabulary once, lazily, when the upload tab is opened.
  pub fn trigger_genres(&mut self) {
    if !self.genres.is_empty() || self.tasks.genres_rx.is_some() {
      return;
    }
    let http = self.client.http();
    let base = self.client.base().clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api::load_genres(&http, &base).await);
    });
    self.tasks.genres_rx = Some(rx);
  }

  /// Validate the draft and, if it passes, send it. Re-entry while a send is
  /// in flight is ignored.
  pub fn trigger_upload(&mut self) {
    if self.upload_status == UploadStatus::Sending {
      return;
    }
    self.refresh_file_summary();
    self.upload_status = UploadStatus::Validating;

    let session = match upload::select(&self.draft.to_form()) {
      Ok(session) => session,
      Err(e) => {
        self.upload_status = UploadStatus::Failed(e.to_string());
        return;
      }
    };

    self.upload_status = UploadStatus::Sending;
    self.upload_progress = Some(0);

    let http = self.client.http();
    let base = self.client.base().clone();
    let (tx, rx) = mpsc::unbounded_channel();
    self.tasks.upload_rx = Some(rx);
    tokio::spawn(session.submit(http, base, tx));
  }

  // --- View transitions ---

  /// Feed one input through the view state machine and apply the resulting
  /// player command. A halt completes before the new state is committed.
  pub async fn drive_view(&mut self, input: ViewInput) {
    let (next, cmd) = transition(self.view, input);
    match cmd {
      Some(PlayerCommand::Start { video_id }) => {
        let Some(video) = self.client.video(video_id) else {
          self.set_error("That video is no longer in the library.".to_string());
          return;
        };
        let now = NowPlaying {
          video_id,
          title: video.title.clone(),
          url: present::stream_url(self.client.base(), video),
        };
        self.view = next;
        if let Err(e) = self.player.play(now).await {
          self.set_error(format!("Playback error: {}", e));
        }
      }
      Some(PlayerCommand::Halt) => {
        if let Err(e) = self.player.stop().await {
          self.set_error(format!("Failed to stop playback: {}", e));
        }
        self.view = next;
      }
      Some(PlayerCommand::TogglePause) => {
        if let Err(e) = self.player.toggle_pause().await {
          self.set_error(format!("Pause error: {}", e));
        }
        self.view = next;
      }
      None => {
        self.view = next;
      }
    }
  }
}
