//! vq-session - Interactive playlist and video queue session
//!
//! Reads one command per line from stdin and turns it into store actions.
//! Notifications are printed as they appear.

mod commands;
mod render;

use clap::Parser;
use libvidqueue::logging::{LogFormat, LoggingConfig};
use libvidqueue::{
    Action, Config, Database, LogPlayback, Result, RootState, SqliteLibrary, Store, StoreOptions,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use commands::Input;

#[derive(Parser, Debug)]
#[command(name = "vq-session")]
#[command(version)]
#[command(about = "Interactive playlist and video queue session")]
#[command(long_about = "\
vq-session - Interactive playlist and video queue session

DESCRIPTION:
    vq-session opens your playlist library and reads commands from stdin,
    one per line. Every command becomes an action applied in order by a
    single store; queue edits (select, move, shuffle) can be undone and
    redone until you switch playlists.

USAGE:
    # Start a session
    vq-session

    # Script a session
    printf 'new Talks\\nopen 1\\nadd dQw4w9WgXcQ\\nshow\\n' | vq-session

    # Machine-readable output
    vq-session --json

COMMANDS:
    Type 'help' inside the session for the full list.

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes accepted actions)

CONFIGURATION:
    Configuration file: ~/.config/vidqueue/config.toml
    Database location: ~/.local/share/vidqueue/library.db

    [dispatcher]
    queue_capacity = 256      # bound of the action queue
    drain_on_shutdown = true  # process accepted actions before exiting

    [notifications]
    ttl_ms = 4000             # 0 keeps notifications until dismissed

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration or database error
")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "VIDQUEUE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Database path (overrides config)
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: text, json or pretty
    #[arg(long, env = "VIDQUEUE_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level or filter directive
    #[arg(long, env = "VIDQUEUE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Print state and notifications as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, cli.log_level.clone(), cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let db = Database::new(&config.database.path).await?;
    let library = Arc::new(SqliteLibrary::new(db));
    let store = Store::spawn(StoreOptions::from(&config), library, Arc::new(LogPlayback));
    let shutdown = store.shutdown_handle();

    #[cfg(unix)]
    let signals = spawn_signal_listener(shutdown.clone())?;

    info!("vq-session starting");

    let observer = tokio::spawn(print_notifications(store.subscribe(), cli.json));
    let dispatcher = store.dispatcher();
    dispatcher.submit(Action::Initialize).await?;

    if !cli.json {
        println!("vq-session ready. Type 'help' for commands.");
    }

    let mut lines = spawn_stdin_reader();
    loop {
        let line = tokio::select! {
            _ = shutdown.wait() => break,
            line = lines.recv() => line,
        };
        // EOF ends the session like 'quit'
        let Some(line) = line else { break };
        let line = line?;

        let state = store.state();
        match commands::parse(&line, &state) {
            Ok(Input::Empty) => {}
            Ok(Input::Quit) => break,
            Ok(Input::Help) => println!("{}", commands::HELP),
            Ok(Input::Show) => print_state(&state, cli.json),
            Ok(Input::Playlists) => {
                if cli.json {
                    println!("{}", render::state_json(&state)["playlists"]);
                } else {
                    println!("{}", render::render_playlists(&state));
                }
            }
            Ok(Input::Dispatch(action)) => {
                debug!(action = action.name(), "Submitting action");
                if let Err(e) = dispatcher.submit(action).await {
                    warn!(error = %e, "Action rejected");
                    break;
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    let final_state = store.shutdown().await;
    if let Err(e) = observer.await {
        warn!(error = %e, "Notification printer failed");
    }

    #[cfg(unix)]
    signals.close();

    info!(
        videos = final_state.queue.videos.len(),
        "vq-session stopped"
    );
    Ok(())
}

/// Read stdin on a plain thread so a pending read never holds up runtime shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (sender, receiver) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn print_state(state: &RootState, json: bool) {
    if json {
        println!("{}", render::state_json(state));
    } else {
        println!("{}", render::render_state(state));
    }
}

/// Print each notification once, when it first appears in a published state
async fn print_notifications(mut states: watch::Receiver<Arc<RootState>>, json: bool) {
    let mut next_unseen = 0;
    // Err means the store stopped publishing
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        for notification in state
            .notifications
            .iter()
            .filter(|n| n.id.0 >= next_unseen)
        {
            if json {
                match serde_json::to_string(notification) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "Failed to encode notification"),
                }
            } else {
                println!("{}", render::render_notification(notification));
            }
        }
        next_unseen = state.next_notification_id;
    }
}

/// Trigger a graceful shutdown on SIGINT or SIGTERM
#[cfg(unix)]
fn spawn_signal_listener(
    shutdown: libvidqueue::store::ShutdownHandle,
) -> Result<signal_hook_tokio::Handle> {
    use futures::stream::StreamExt;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook_tokio::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|e| {
        libvidqueue::VidqueueError::InvalidInput(format!("Signal setup failed: {}", e))
    })?;
    let handle = signals.handle();

    tokio::spawn(async move {
        if let Some(signal) = signals.next().await {
            info!(signal, "Received shutdown signal, stopping gracefully...");
            shutdown.trigger();
        }
    });

    Ok(handle)
}
