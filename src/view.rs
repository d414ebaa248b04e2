//! View-mode state machine: Browse, the full-screen player, and the detail
//! modal are mutually exclusive, and every switch between them goes through
//! `transition`. The shell owns the media element and executes the returned
//! `PlayerCommand` before committing the new state, so a `Back` out of the
//! player is only complete once playback is halted and the source released.

/// The current view mode. The modal only ever opens over Browse, so closing
/// it always restores Browse; opening it from the player is deliberately
/// undefined and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
  Browse,
  Player { video_id: i64 },
  Modal { video_id: i64 },
}

/// User intents the view layer feeds into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewInput {
  /// Open the detail modal for a video (browse click / featured "info").
  OpenModal(i64),
  /// Play a video directly, bypassing the modal (featured "play" shortcut).
  Play(i64),
  /// The modal's play button: close the modal and play its video.
  ModalPlay,
  /// Close the modal.
  Close,
  /// Leave the player.
  Back,
  /// Cancel key: closes the modal, or leaves the player.
  Escape,
  /// Space in the player: toggle play/pause, no state change.
  TogglePause,
}

/// Side effect the shell must apply to the media element. `Halt` must finish
/// (stop playback, clear the source) before the transition counts as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
  Start { video_id: i64 },
  Halt,
  TogglePause,
}

pub fn transition(state: ViewState, input: ViewInput) -> (ViewState, Option<PlayerCommand>) {
  use PlayerCommand as Cmd;
  use ViewInput as In;
  use ViewState as St;

  match (state, input) {
    (St::Browse, In::OpenModal(video_id)) => (St::Modal { video_id }, None),
    (St::Browse, In::Play(video_id)) => (St::Player { video_id }, Some(Cmd::Start { video_id })),

    (St::Modal { video_id }, In::ModalPlay) => (St::Player { video_id }, Some(Cmd::Start { video_id })),
    (St::Modal { .. }, In::Close | In::Escape) => (St::Browse, None),

    (St::Player { .. }, In::Back | In::Escape) => (St::Browse, Some(Cmd::Halt)),
    (St::Player { video_id }, In::TogglePause) => (St::Player { video_id }, Some(Cmd::TogglePause)),

    // No transition is defined from Player to Modal; reaching detail info
    // while playing requires going back to Browse first.
    (state, _) => (state, None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use PlayerCommand as Cmd;
  use ViewInput as In;
  use ViewState as St;

  // --- defined transitions ---

  #[test]
  fn browse_open_modal_then_play_reaches_player() {
    let (modal, cmd) = transition(St::Browse, In::OpenModal(3));
    assert_eq!(modal, St::Modal { video_id: 3 });
    assert_eq!(cmd, None);

    let (player, cmd) = transition(modal, In::ModalPlay);
    assert_eq!(player, St::Player { video_id: 3 });
    assert_eq!(cmd, Some(Cmd::Start { video_id: 3 }));
  }

  #[test]
  fn back_from_player_halts_the_media_element() {
    let (state, cmd) = transition(St::Player { video_id: 3 }, In::Back);
    assert_eq!(state, St::Browse);
    assert_eq!(cmd, Some(Cmd::Halt));
  }

  #[test]
  fn featured_play_shortcut_bypasses_the_modal() {
    let (state, cmd) = transition(St::Browse, In::Play(7));
    assert_eq!(state, St::Player { video_id: 7 });
    assert_eq!(cmd, Some(Cmd::Start { video_id: 7 }));
  }

  #[test]
  fn modal_close_restores_browse() {
    assert_eq!(transition(St::Modal { video_id: 1 }, In::Close), (St::Browse, None));
  }

  #[test]
  fn escape_closes_modal_and_leaves_player() {
    assert_eq!(transition(St::Modal { video_id: 1 }, In::Escape), (St::Browse, None));
    assert_eq!(transition(St::Player { video_id: 1 }, In::Escape), (St::Browse, Some(Cmd::Halt)));
  }

  #[test]
  fn toggle_pause_stays_in_player() {
    let (state, cmd) = transition(St::Player { video_id: 2 }, In::TogglePause);
    assert_eq!(state, St::Player { video_id: 2 });
    assert_eq!(cmd, Some(Cmd::TogglePause));
  }

  // --- undefined transitions are no-ops ---

  #[test]
  fn player_ignores_open_modal() {
    let (state, cmd) = transition(St::Player { video_id: 2 }, In::OpenModal(5));
    assert_eq!(state, St::Player { video_id: 2 });
    assert_eq!(cmd, None);
  }

  #[test]
  fn browse_ignores_player_only_inputs() {
    assert_eq!(transition(St::Browse, In::Back), (St::Browse, None));
    assert_eq!(transition(St::Browse, In::TogglePause), (St::Browse, None));
    assert_eq!(transition(St::Browse, In::ModalPlay), (St::Browse, None));
  }
}
