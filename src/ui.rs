use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, BrowsePane, Tab, UploadField};
use crate::catalog::Category;
use crate::input::char_to_byte_index;
use crate::present;
use crate::upload::UploadStatus;
use crate::view::ViewState;

// --- Helpers ---

/// Truncate a string to `max_width` display columns (accounting for
/// double-width CJK), appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
  if s.width() <= max_width {
    return s.to_string();
  }
  let keep = max_width.saturating_sub(1);
  let mut used = 0;
  let mut truncated = String::new();
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w > keep {
      break;
    }
    used += w;
    truncated.push(c);
  }
  format!("{}…", truncated)
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
      .areas(frame.area());

  render_header(frame, app, header_area);
  match app.view {
    ViewState::Player { video_id } => render_player(frame, app, video_id, main_area),
    ViewState::Browse | ViewState::Modal { .. } => match app.tab {
      Tab::Videos => render_browse(frame, app, main_area),
      Tab::Upload => render_upload(frame, app, main_area),
    },
  }
  if let ViewState::Modal { video_id } = app.view {
    render_modal(frame, app, video_id, main_area);
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let tab_style = |active: bool| {
    if active {
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    }
  };
  let left = Line::from(vec![
    Span::styled(" ▶ vidshelf ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(" Videos ", tab_style(app.tab == Tab::Videos)),
    Span::styled(" Upload ", tab_style(app.tab == Tab::Upload)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

// --- Browse ---

fn render_browse(frame: &mut Frame, app: &mut App, area: Rect) {
  let [categories_area, right_area] =
    Layout::horizontal([Constraint::Length(24), Constraint::Min(20)]).areas(area);
  let [featured_area, videos_area] =
    Layout::vertical([Constraint::Length(7), Constraint::Min(3)]).areas(right_area);

  render_categories(frame, app, categories_area);
  render_featured(frame, app, featured_area);
  render_video_list(frame, app, videos_area);
}

fn render_categories(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.pane == BrowsePane::Categories;

  let items: Vec<ListItem> = app
    .categories
    .iter()
    .map(|category: &Category| {
      let label = format!("{} ({})", category.label, category.items.len());
      ListItem::new(Line::from(Span::styled(label, Style::default().fg(theme.fg))))
    })
    .collect();

  let border = if focused { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(" Categories ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.category_state);
}

fn render_featured(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(" Featured ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  let Some(video) = app.featured_video() else {
    let empty = Paragraph::new(Line::from(Span::styled("The library is empty.", Style::default().fg(theme.muted))))
      .block(block);
    frame.render_widget(empty, area);
    return;
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let mut meta = Vec::new();
  if let Some(genre) = video.genre() {
    meta.push(genre.to_string());
  }
  if let Some(year) = present::display_year(video) {
    meta.push(year.to_string());
  }
  meta.push(present::formatted_size(video.size));

  let lines = vec![
    Line::from(Span::styled(
      truncate_str(&video.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(meta.join("  ·  "), Style::default().fg(theme.muted))),
    Line::from(Span::styled(truncate_str(&present::summary_line(video), inner_w), Style::default().fg(theme.fg))),
    Line::from(Span::styled(
      truncate_str(&present::cover_url(app.client.base(), video), inner_w),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
    Line::from(vec![
      Span::styled(" f ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" Play  ", Style::default().fg(theme.muted)),
      Span::styled(" i ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" More info", Style::default().fg(theme.muted)),
    ]),
  ];

  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_video_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.pane == BrowsePane::Videos;

  if let Some(err) = &app.catalog_error {
    let lines = vec![
      Line::from(""),
      Line::from(Span::styled(format!("⚠  {}", err), Style::default().fg(theme.error))),
      Line::from(""),
      Line::from(Span::styled("Press r to retry.", Style::default().fg(theme.muted))),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
      Block::bordered()
        .title(" Videos ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .padding(Padding::horizontal(1)),
    );
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let catalog = app.client.catalog();
  let items: Vec<ListItem> = app
    .visible_videos()
    .iter()
    .enumerate()
    .filter_map(|(i, &idx)| catalog.get(idx).map(|v| (i, v)))
    .map(|(i, video)| {
      let is_selected = focused && Some(i) == app.video_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let right = match video.genre() {
        Some(genre) => format!("{}  {}", genre, present::formatted_size(video.size)),
        None => present::formatted_size(video.size),
      };
      let right_w = right.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&video.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let title = {
    let sel = app.category_state.selected().unwrap_or(0);
    match app.categories.get(sel) {
      Some(c) => format!(" {} — {} videos ", c.label, c.items.len()),
      None => " Videos ".to_string(),
    }
  };

  let border = if focused { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.video_state);
}

// --- Player ---

fn render_player(frame: &mut Frame, app: &App, video_id: i64, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(" Now Playing ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  let Some(video) = app.client.video(video_id) else {
    frame.render_widget(block, area);
    return;
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.muted));
  let value = |s: String| Span::styled(s, Style::default().fg(theme.fg));

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&video.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(vec![label("Genre     "), value(video.genre().unwrap_or("Not specified").to_string())]),
  ];
  if let Some(year) = present::display_year(video) {
    lines.push(Line::from(vec![label("Year      "), value(year.to_string())]));
  }
  lines.push(Line::from(vec![label("Size      "), value(present::formatted_size(video.size))]));
  if let Some(description) = video.description() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(description.to_string(), Style::default().fg(theme.fg))));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    truncate_str(&present::stream_url(app.client.base(), video), inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));
  if app.player.paused {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("⏸ Paused", Style::default().fg(theme.status))));
  }

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

// --- Modal ---

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let w = width.min(area.width);
  let h = height.min(area.height);
  Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

fn render_modal(frame: &mut Frame, app: &App, video_id: i64, area: Rect) {
  let theme = app.theme();
  let popup = centered_rect(area, 60, 14);
  frame.render_widget(Clear, popup);

  let block = Block::bordered()
    .title(" Details ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.accent))
    .padding(Padding::horizontal(1))
    .style(Style::default().bg(theme.bg));

  let Some(video) = app.client.video(video_id) else {
    frame.render_widget(
      Paragraph::new(Line::from(Span::styled("Video not found.", Style::default().fg(theme.error)))).block(block),
      popup,
    );
    return;
  };

  let inner_w = popup.width.saturating_sub(4) as usize;
  let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.muted));
  let value = |s: String| Span::styled(s, Style::default().fg(theme.fg));

  let mut lines = vec![
    Line::from(Span::styled(
      truncate_str(&video.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(vec![label("Genre  "), value(video.genre().unwrap_or("Not specified").to_string())]),
  ];
  if let Some(year) = present::display_year(video) {
    lines.push(Line::from(vec![label("Year   "), value(year.to_string())]));
  }
  lines.push(Line::from(vec![label("Size   "), value(present::formatted_size(video.size))]));
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    video.description().unwrap_or("No description.").to_string(),
    Style::default().fg(theme.fg),
  )));
  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    Span::styled(" Enter ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
    Span::styled(" Play  ", Style::default().fg(theme.muted)),
    Span::styled(" Esc ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
    Span::styled(" Close", Style::default().fg(theme.muted)),
  ]));

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), popup);
}

// --- Upload ---

fn render_upload(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(" Upload a video ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let mut lines = vec![Line::from("")];

  for field in UploadField::ALL {
    let active = field == app.upload_field;
    let label_style = if active {
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    let text = app.draft.field(field);
    let shown = if active {
      // Splice a cursor marker at the edit position.
      let byte_idx = char_to_byte_index(text, app.field_cursor);
      format!("{}│{}", &text[..byte_idx], &text[byte_idx..])
    } else {
      text.clone()
    };
    lines.push(Line::from(vec![
      Span::styled(format!("{:<14}", field.label()), label_style),
      Span::styled(truncate_str(&shown, inner_w.saturating_sub(14)), Style::default().fg(theme.fg)),
    ]));
  }

  if let Some(summary) = &app.file_summary {
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      Span::styled("Selected: ", Style::default().fg(theme.muted)),
      Span::styled(truncate_str(summary, inner_w.saturating_sub(10)), Style::default().fg(theme.fg)),
    ]));
  }

  if !app.genres.is_empty() {
    let names: Vec<&str> = app.genres.iter().map(|g| g.name.as_str()).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      truncate_str(&format!("Known genres: {}", names.join(", ")), inner_w),
      Style::default().fg(theme.muted),
    )));
  }

  lines.push(Line::from(""));
  match &app.upload_status {
    UploadStatus::Sending => {
      let percent = app.upload_progress.unwrap_or(0) as usize;
      let bar_w = inner_w.saturating_sub(7).max(10);
      let filled = bar_w * percent.min(100) / 100;
      lines.push(Line::from(vec![
        Span::styled("█".repeat(filled), Style::default().fg(theme.accent)),
        Span::styled("░".repeat(bar_w - filled), Style::default().fg(theme.border)),
        Span::styled(format!(" {:>3}%", percent), Style::default().fg(theme.fg)),
      ]));
    }
    UploadStatus::Succeeded(message) => {
      lines.push(Line::from(Span::styled(format!("✔ {}", message), Style::default().fg(theme.status))));
    }
    UploadStatus::Failed(message) => {
      lines.push(Line::from(Span::styled(format!("⚠ {}", message), Style::default().fg(theme.error))));
    }
    UploadStatus::Idle | UploadStatus::Validating => {}
  }

  frame.render_widget(Paragraph::new(lines).block(block), area);
}

// --- Status and footer ---

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if app.upload_status == UploadStatus::Sending {
    (format!(" ⇧ Uploading… {}%", app.upload_progress.unwrap_or(0)), Style::default().fg(theme.status))
  } else {
    match app.player.last_status() {
      Some(status) => (format!(" ▶ {}", status), Style::default().fg(theme.status)),
      None => (" Ready".to_string(), Style::default().fg(theme.muted)),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.view {
    ViewState::Player { .. } => {
      let pause_label = if app.player.paused { "Resume" } else { "Pause" };
      vec![("Space", pause_label), ("Esc", "Back")]
    }
    ViewState::Modal { .. } => vec![("Enter", "Play"), ("Esc", "Close")],
    ViewState::Browse => match app.tab {
      Tab::Videos => vec![
        ("Enter", "Details"),
        ("p", "Play"),
        ("j/k", "Navigate"),
        ("h/l", "Pane"),
        ("r", "Reload"),
        ("Tab", "Upload"),
        ("Esc", "Quit"),
      ],
      Tab::Upload => vec![("Enter", "Submit"), ("↑/↓", "Field"), ("^r", "Reset"), ("Tab", "Videos")],
    },
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
