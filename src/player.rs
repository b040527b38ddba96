//! External player integration.
//!
//! Opens a related video in the configured player, falling back to the
//! platform URL opener.

use anyhow::{Context, Result};
use std::process::{Child, Command, ExitStatus};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Platform command that opens a URL with the default handler.
#[cfg(target_os = "macos")]
const SYSTEM_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const SYSTEM_OPENER: &str = "xdg-open";

/// Open a video URL.
///
/// # Arguments
/// * `video_url` - Watch URL (e.g., https://www.youtube.com/watch?v=VIDEO_ID)
/// * `player` - Player command from configuration (e.g. "mpv")
///
/// # Details
/// mpv plays YouTube URLs directly when yt-dlp is installed. If the player
/// cannot be started the URL is handed to the system opener instead. The
/// spawned process is waited on in the background. Must be called from within
/// a tokio runtime.
pub fn open_video(video_url: &str, player: &str) -> Result<()> {
    if !player.is_empty() {
        match player_command(player, video_url).spawn() {
            Ok(child) => {
                debug!(player = %player, url = %video_url, "Opened video");
                reap(child);
                return Ok(());
            }
            Err(e) => warn!(player = %player, error = %e, "Player failed to start"),
        }
    }

    let child = Command::new(SYSTEM_OPENER)
        .arg(video_url)
        .spawn()
        .with_context(|| {
            format!(
                "Failed to open video with '{}' or {}. URL: {}",
                player, SYSTEM_OPENER, video_url
            )
        })?;
    reap(child);

    Ok(())
}

/// Wait for a spawned process on a blocking task so it does not linger as a zombie.
fn reap(mut child: Child) -> JoinHandle<Option<ExitStatus>> {
    tokio::task::spawn_blocking(move || match child.wait() {
        Ok(status) => {
            debug!(pid = child.id(), %status, "External process exited");
            Some(status)
        }
        Err(e) => {
            warn!(pid = child.id(), error = %e, "Failed to wait for external process");
            None
        }
    })
}

/// Build the command line for a player.
fn player_command(player: &str, video_url: &str) -> Command {
    let mut cmd = Command::new(player);
    if player == "mpv" {
        cmd.arg("--player-operation-mode=pseudo-gui")
            .arg("--ytdl-format=best[height<=?1080]/bestvideo[height<=?1080]+bestaudio/best");
    }
    cmd.arg(video_url);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpv_command_has_gui_mode() {
        let cmd = player_command("mpv", "https://www.youtube.com/watch?v=abc");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(cmd.get_program(), "mpv");
        assert_eq!(args[0], "--player-operation-mode=pseudo-gui");
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_process_is_reaped() {
        let child = Command::new("true").spawn().unwrap();
        let status = reap(child).await.unwrap();
        assert!(status.is_some_and(|s| s.success()));
    }

    #[test]
    fn test_other_player_gets_url_only() {
        let cmd = player_command("vlc", "https://www.youtube.com/watch?v=abc");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["https://www.youtube.com/watch?v=abc"]);
    }
}
