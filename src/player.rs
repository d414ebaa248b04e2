use std::process::Stdio;
use tokio::{
  io::AsyncBufReadExt,
  io::BufReader as TokioBufReader,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::info;

use crate::error::PlaybackError;

/// What the media element is currently bound to.
#[derive(Debug, Clone)]
pub struct NowPlaying {
  pub video_id: i64,
  pub title: String,
  pub url: String,
}

/// The shared media element: one mpv process at a time, exclusively owned by
/// the shell's player-command executor. Only the halt path may stop it and
/// release the source, which prevents double-release races.
pub struct VideoPlayer {
  current_process: Option<TokioChild>,
  current: Option<NowPlaying>,
  mpv_monitor_handle: Option<JoinHandle<()>>,
  mpv_status_rx: Option<mpsc::Receiver<String>>,
  last_mpv_status: Option<String>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl VideoPlayer {
  pub fn new() -> Self {
    Self {
      current_process: None,
      current: None,
      mpv_monitor_handle: None,
      mpv_status_rx: None,
      last_mpv_status: None,
      ipc_socket_path: None,
      paused: false,
    }
  }

  pub fn has_source(&self) -> bool {
    self.current.is_some()
  }

  pub fn current(&self) -> Option<&NowPlaying> {
    self.current.as_ref()
  }

  pub fn check_status(&mut self) {
    if let Some(rx) = &mut self.mpv_status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_mpv_status = Some(status);
      }
    }
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_mpv_status.as_deref()
  }

  /// Bind the player to a stream URL and start playback.
  pub async fn play(&mut self, now: NowPlaying) -> Result<(), PlaybackError> {
    self.stop().await?;
    self.paused = false;

    let socket_path = std::env::temp_dir().join(format!("vidshelf-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_string_lossy().to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--term-status-msg=Time: ${time-pos/full} / ${duration/full} | ${pause} ${percent-pos}%",
      &format!("--force-media-title={}", now.title),
      &format!("--input-ipc-server={}", socket_path_str),
      &now.url,
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null — if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound { PlaybackError::PlayerMissing } else { PlaybackError::Io(e) }
    })?;

    if let Some(stdout) = child.stdout.take() {
      let (tx, rx) = mpsc::channel::<String>(10);
      self.mpv_status_rx = Some(rx);
      self.mpv_monitor_handle = Some(tokio::spawn(async move {
        let reader = TokioBufReader::new(stdout);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
          if tx.send(line).await.is_err() {
            break;
          }
        }
      }));
    }

    info!(video_id = now.video_id, url = %now.url, "playback started");
    self.current_process = Some(child);
    self.current = Some(now);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<(), PlaybackError> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await?;
    stream.writable().await?;
    let cmd = b"{\"command\":[\"cycle\",\"pause\"]}\n";
    let written = stream.try_write(cmd)?;
    if written < cmd.len() {
      return Err(PlaybackError::Io(std::io::Error::new(
        std::io::ErrorKind::WriteZero,
        "partial write to mpv IPC socket",
      )));
    }
    self.paused = !self.paused;
    Ok(())
  }

  /// Halt playback and release the media source. Must complete before a
  /// transition out of the player view counts as done.
  pub async fn stop(&mut self) -> Result<(), PlaybackError> {
    if let Some(handle) = self.mpv_monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.mpv_status_rx = None;
    self.last_mpv_status = None;

    if let Some(mut child) = self.current_process.take() {
      child.kill().await?;
      let _ = child.wait().await;
    }

    self.current = None;
    self.paused = false;

    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn stop_on_idle_player_is_a_clean_noop() {
    let mut player = VideoPlayer::new();
    player.stop().await.expect("idle stop");
    assert!(!player.has_source());
    assert!(player.current().is_none());
  }

  #[tokio::test]
  async fn toggle_pause_without_source_does_nothing() {
    let mut player = VideoPlayer::new();
    player.toggle_pause().await.expect("no socket, no-op");
    assert!(!player.paused);
  }
}
