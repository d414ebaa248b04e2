use ratatui::style::Color;

/// A named color scheme. All UI colors come from here; widgets never hardcode
/// a `Color` directly.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: &[Theme] = &[
  Theme {
    name: "midnight",
    bg: Color::Rgb(18, 18, 24),
    fg: Color::Rgb(214, 214, 224),
    muted: Color::Rgb(120, 120, 140),
    accent: Color::Rgb(137, 180, 250),
    border: Color::Rgb(60, 60, 78),
    status: Color::Rgb(166, 218, 149),
    error: Color::Rgb(237, 135, 150),
    highlight_fg: Color::Rgb(24, 24, 32),
    highlight_bg: Color::Rgb(137, 180, 250),
    stripe_bg: Color::Rgb(26, 26, 34),
    key_fg: Color::Rgb(24, 24, 32),
    key_bg: Color::Rgb(120, 120, 140),
  },
  Theme {
    name: "marquee",
    bg: Color::Rgb(20, 14, 16),
    fg: Color::Rgb(235, 219, 200),
    muted: Color::Rgb(146, 120, 110),
    accent: Color::Rgb(250, 179, 135),
    border: Color::Rgb(84, 60, 54),
    status: Color::Rgb(244, 219, 148),
    error: Color::Rgb(243, 139, 168),
    highlight_fg: Color::Rgb(30, 20, 22),
    highlight_bg: Color::Rgb(250, 179, 135),
    stripe_bg: Color::Rgb(30, 22, 24),
    key_fg: Color::Rgb(30, 20, 22),
    key_bg: Color::Rgb(146, 120, 110),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(245, 243, 238),
    fg: Color::Rgb(50, 48, 44),
    muted: Color::Rgb(140, 134, 122),
    accent: Color::Rgb(30, 102, 245),
    border: Color::Rgb(200, 194, 182),
    status: Color::Rgb(64, 160, 43),
    error: Color::Rgb(210, 15, 57),
    highlight_fg: Color::Rgb(245, 243, 238),
    highlight_bg: Color::Rgb(30, 102, 245),
    stripe_bg: Color::Rgb(236, 233, 226),
    key_fg: Color::Rgb(245, 243, 238),
    key_bg: Color::Rgb(140, 134, 122),
  },
];

pub fn theme_index_by_name(name: &str) -> Option<usize> {
  THEMES.iter().position(|t| t.name == name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_names_are_unique() {
    for (i, a) in THEMES.iter().enumerate() {
      for b in &THEMES[i + 1..] {
        assert_ne!(a.name, b.name);
      }
    }
  }

  #[test]
  fn lookup_by_name_round_trips() {
    for (i, t) in THEMES.iter().enumerate() {
      assert_eq!(theme_index_by_name(t.name), Some(i));
    }
    assert_eq!(theme_index_by_name("nope"), None);
  }
}
