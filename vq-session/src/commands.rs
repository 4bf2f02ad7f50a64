//! Line commands typed into a session
//!
//! Positions shown to and typed by the user are 1-based; actions use
//! 0-based indexes.

use libvidqueue::{
    Action, NewPlaylist, NewVideo, NotificationId, PlaybackCommand, PlayerState, PlaylistId,
    Result, RootState, VidqueueError,
};

#[derive(Debug, PartialEq)]
pub enum Input {
    Dispatch(Action),
    Show,
    Playlists,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
    playlists                     List playlists
    reload                        Reload the playlist list
    new <name> [| description]    Create a playlist
    open <number|id>              Open a playlist
    add <reference> [title]       Add a video (id or URL) to the open playlist
    select <n> [play]             Make video n current, optionally playing it
    move <from> <to>              Move a video
    shuffle [seed]                Shuffle the queue
    undo | redo                   Step through queue history
    play | pause | resume | stop  Control the player
    state <player-state>          Report a player state (empty, loading, buffering, playing, paused)
    dismiss <id>                  Dismiss a notification
    show                          Print the session state
    help                          Show this help
    quit                          Exit";

/// Parse one input line against the latest published state
pub fn parse(line: &str, state: &RootState) -> Result<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word {
        "" => Input::Empty,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "show" => Input::Show,
        "playlists" | "ls" => Input::Playlists,
        "reload" => Input::Dispatch(Action::Initialize),

        "new" => {
            let (name, description) = match rest.split_once('|') {
                Some((name, description)) => (name.trim(), Some(description.trim())),
                None => (rest, None),
            };
            if name.is_empty() {
                return Err(usage("new <name> [| description]"));
            }
            Input::Dispatch(Action::CreatePlaylistRequested(NewPlaylist {
                name: name.to_string(),
                description: description.filter(|d| !d.is_empty()).map(str::to_string),
            }))
        }

        "open" => Input::Dispatch(Action::SelectPlaylist(resolve_playlist(rest, state)?)),

        "add" => {
            let playlist_id = state
                .queue
                .selected_playlist_id
                .clone()
                .ok_or_else(|| VidqueueError::InvalidInput("Open a playlist first".to_string()))?;
            let (reference, title) = match rest.split_once(char::is_whitespace) {
                Some((reference, title)) => (reference, Some(title.trim().to_string())),
                None => (rest, None),
            };
            if reference.is_empty() {
                return Err(usage("add <reference> [title]"));
            }
            Input::Dispatch(Action::AddVideoRequested(NewVideo {
                playlist_id,
                reference: reference.to_string(),
                title,
            }))
        }

        "select" => {
            let mut args = rest.split_whitespace();
            let index = position(args.next(), "select <n> [play]")?;
            let autoplay = match args.next() {
                None => false,
                Some("play") => true,
                Some(_) => return Err(usage("select <n> [play]")),
            };
            Input::Dispatch(Action::SelectVideo { index, autoplay })
        }

        "move" => {
            let mut args = rest.split_whitespace();
            let from = position(args.next(), "move <from> <to>")?;
            let to = position(args.next(), "move <from> <to>")?;
            Input::Dispatch(Action::ReorderVideo { from, to })
        }

        "shuffle" => {
            let seed = if rest.is_empty() {
                rand::random()
            } else {
                rest.parse().map_err(|_| usage("shuffle [seed]"))?
            };
            Input::Dispatch(Action::ShuffleQueue { seed })
        }

        "undo" => Input::Dispatch(Action::UndoRequested),
        "redo" => Input::Dispatch(Action::RedoRequested),

        "play" => {
            let video = state.queue.current_video().ok_or_else(|| {
                VidqueueError::InvalidInput("No current video; use 'select <n> play'".to_string())
            })?;
            Input::Dispatch(Action::PlaybackRequested(PlaybackCommand::Play(
                video.video_ref.clone(),
            )))
        }
        "pause" => Input::Dispatch(Action::PlaybackRequested(PlaybackCommand::Pause)),
        "resume" => Input::Dispatch(Action::PlaybackRequested(PlaybackCommand::Resume)),
        "stop" => Input::Dispatch(Action::PlaybackRequested(PlaybackCommand::Stop)),

        "state" => {
            let player = rest
                .parse::<PlayerState>()
                .map_err(VidqueueError::InvalidInput)?;
            Input::Dispatch(Action::PlayerStateChanged(player))
        }

        "dismiss" => {
            let id = rest.parse().map_err(|_| usage("dismiss <id>"))?;
            Input::Dispatch(Action::DismissNotification(NotificationId(id)))
        }

        other => {
            return Err(VidqueueError::InvalidInput(format!(
                "Unknown command '{}'. Type 'help' for a list of commands",
                other
            )))
        }
    };

    Ok(input)
}

fn usage(text: &str) -> VidqueueError {
    VidqueueError::InvalidInput(format!("Usage: {}", text))
}

/// 1-based user position to 0-based index
fn position(arg: Option<&str>, usage_text: &str) -> Result<usize> {
    match arg.and_then(|a| a.parse::<usize>().ok()) {
        Some(n) if n > 0 => Ok(n - 1),
        _ => Err(usage(usage_text)),
    }
}

/// A number picks from the listed playlists; anything else is taken as an id
fn resolve_playlist(arg: &str, state: &RootState) -> Result<PlaylistId> {
    if arg.is_empty() {
        return Err(usage("open <number|id>"));
    }
    if let Ok(n) = arg.parse::<usize>() {
        let items = state.playlists.items();
        return match n.checked_sub(1).and_then(|i| items.get(i)) {
            Some(playlist) => Ok(playlist.id.clone()),
            None => Err(VidqueueError::InvalidInput(format!(
                "No playlist number {} ({} listed)",
                n,
                items.len()
            ))),
        };
    }
    Ok(PlaylistId::from(arg))
}
