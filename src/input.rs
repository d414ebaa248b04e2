use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, BrowsePane, Tab, UploadField};
use crate::upload::UploadStatus;
use crate::view::{ViewInput, ViewState};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  // Tab switching is a browse-level action; the player and modal keep their
  // own key maps.
  if key.code == KeyCode::Tab && app.view == ViewState::Browse {
    match app.tab {
      Tab::Videos => {
        app.tab = Tab::Upload;
        app.trigger_genres();
      }
      Tab::Upload => {
        app.tab = Tab::Videos;
        // Coming back to the library always shows fresh data.
        app.trigger_reload();
      }
    }
    return Ok(());
  }

  match app.view {
    ViewState::Browse => match app.tab {
      Tab::Videos => handle_browse_key(app, key).await,
      Tab::Upload => handle_upload_key(app, key),
    },
    ViewState::Player { .. } => handle_player_key(app, key).await,
    ViewState::Modal { .. } => handle_modal_key(app, key).await,
  }
  Ok(())
}

async fn handle_browse_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      if let Some(id) = app.selected_video().map(|v| v.id) {
        app.drive_view(ViewInput::OpenModal(id)).await;
      }
    }
    KeyCode::Char('p') => {
      if let Some(id) = app.selected_video().map(|v| v.id) {
        app.drive_view(ViewInput::Play(id)).await;
      }
    }
    KeyCode::Char('f') => {
      if let Some(id) = app.featured_video().map(|v| v.id) {
        app.drive_view(ViewInput::Play(id)).await;
      }
    }
    KeyCode::Char('i') => {
      if let Some(id) = app.featured_video().map(|v| v.id) {
        app.drive_view(ViewInput::OpenModal(id)).await;
      }
    }
    KeyCode::Char('r') => {
      app.trigger_reload();
    }
    KeyCode::Left | KeyCode::Char('h') => {
      app.pane = BrowsePane::Categories;
    }
    KeyCode::Right | KeyCode::Char('l') => {
      app.pane = BrowsePane::Videos;
    }
    KeyCode::Down | KeyCode::Char('j') => select_next(app),
    KeyCode::Up | KeyCode::Char('k') => select_prev(app),
    KeyCode::Esc | KeyCode::Char('q') => {
      app.should_quit = true;
    }
    _ => {}
  }
}

fn select_next(app: &mut App) {
  match app.pane {
    BrowsePane::Categories => {
      let count = app.categories.len();
      if count > 0 {
        let i = app.category_state.selected().map_or(0, |i| (i + 1) % count);
        app.category_state.select(Some(i));
        reset_video_selection(app);
      }
    }
    BrowsePane::Videos => {
      let count = app.visible_videos().len();
      if count > 0 {
        let i = app.video_state.selected().map_or(0, |i| (i + 1) % count);
        app.video_state.select(Some(i));
      }
    }
  }
}

fn select_prev(app: &mut App) {
  match app.pane {
    BrowsePane::Categories => {
      let count = app.categories.len();
      if count > 0 {
        let i = app.category_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.category_state.select(Some(i));
        reset_video_selection(app);
      }
    }
    BrowsePane::Videos => {
      let count = app.visible_videos().len();
      if count > 0 {
        let i = app.video_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.video_state.select(Some(i));
      }
    }
  }
}

fn reset_video_selection(app: &mut App) {
  if app.visible_videos().is_empty() {
    app.video_state.select(None);
  } else {
    app.video_state.select(Some(0));
  }
}

async fn handle_player_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char(' ') => {
      app.drive_view(ViewInput::TogglePause).await;
    }
    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
      app.drive_view(ViewInput::Back).await;
    }
    _ => {}
  }
}

async fn handle_modal_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char('p') => {
      app.drive_view(ViewInput::ModalPlay).await;
    }
    KeyCode::Esc | KeyCode::Char('q') => {
      app.drive_view(ViewInput::Close).await;
    }
    _ => {}
  }
}

fn handle_upload_key(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
    if app.upload_status != UploadStatus::Sending {
      app.draft.reset();
      app.file_summary = None;
      app.field_cursor = 0;
      app.upload_field = UploadField::File;
      app.upload_status = UploadStatus::Idle;
    }
    return;
  }

  // A terminal outcome is dismissed by the next keystroke.
  if matches!(app.upload_status, UploadStatus::Succeeded(_) | UploadStatus::Failed(_)) {
    app.upload_status = UploadStatus::Idle;
  }

  match key.code {
    KeyCode::Enter => {
      app.trigger_upload();
    }
    KeyCode::Esc => {
      app.tab = Tab::Videos;
      app.trigger_reload();
    }
    KeyCode::Down => {
      if app.upload_field == UploadField::File {
        app.refresh_file_summary();
      }
      let idx = UploadField::ALL.iter().position(|f| *f == app.upload_field).unwrap_or(0);
      app.upload_field = UploadField::ALL[(idx + 1) % UploadField::ALL.len()];
      app.field_cursor = app.draft.field(app.upload_field).chars().count();
    }
    KeyCode::Up => {
      if app.upload_field == UploadField::File {
        app.refresh_file_summary();
      }
      let idx = UploadField::ALL.iter().position(|f| *f == app.upload_field).unwrap_or(0);
      app.upload_field = UploadField::ALL[(idx + UploadField::ALL.len() - 1) % UploadField::ALL.len()];
      app.field_cursor = app.draft.field(app.upload_field).chars().count();
    }
    KeyCode::Char(c) => {
      let field = app.draft.field_mut(app.upload_field);
      let byte_idx = char_to_byte_index(field, app.field_cursor);
      field.insert(byte_idx, c);
      app.field_cursor += 1;
    }
    KeyCode::Backspace => {
      if app.field_cursor > 0 {
        app.field_cursor -= 1;
        let field = app.draft.field_mut(app.upload_field);
        let byte_idx = char_to_byte_index(field, app.field_cursor);
        field.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      let field = app.draft.field_mut(app.upload_field);
      if app.field_cursor < field.chars().count() {
        let byte_idx = char_to_byte_index(field, app.field_cursor);
        field.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.field_cursor = app.field_cursor.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.field_cursor < app.draft.field(app.upload_field).chars().count() {
        app.field_cursor += 1;
      }
    }
    KeyCode::Home => {
      app.field_cursor = 0;
    }
    KeyCode::End => {
      app.field_cursor = app.draft.field(app.upload_field).chars().count();
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_index_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5);
  }

  #[test]
  fn char_to_byte_index_multibyte() {
    let s = "héllo";
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
  }

  #[test]
  fn char_to_byte_index_past_end_clamps_to_len() {
    assert_eq!(char_to_byte_index("ab", 10), 2);
  }
}
