//! Terminal control panel.
//!
//! The panel runs a [`RigWorker`] in the background and talks to it over
//! its [`RigHandle`]: key presses become [`Command`]s, and every
//! [`RigEvent`](spinrig_core::RigEvent) the worker publishes is folded into
//! the [`App`] before the next frame.

pub mod app;
pub mod input;
pub mod ui;

pub use app::App;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use spinrig_core::{Command, RigEvent, RigHandle, RigWorker};

use crate::config::Config;

/// Set up the terminal for TUI rendering.
///
/// Enables raw mode and switches to the alternate screen buffer.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the control panel until the operator quits.
pub async fn run(config: Config) -> Result<()> {
    let rig = config.rig().context("Failed to set up relays")?;
    let (worker, handle) = RigWorker::new(rig, config.worker_options())?;
    let worker_handle = tokio::spawn(worker.run());

    let RigHandle {
        commands,
        mut events,
        cancel,
    } = handle;

    let mut app = App::from_config(&config);
    let mut terminal = setup_terminal()?;
    info!("Control panel started");

    let result = run_event_loop(&mut terminal, &mut app, &commands, &mut events).await;

    if commands.try_send(Command::Shutdown).is_err() {
        cancel.cancel();
    }
    // A closed event channel unblocks any send the worker is waiting on.
    drop(events);

    restore_terminal()?;

    if let Err(e) = worker_handle.await {
        warn!(error = %e, "Rig worker panicked");
    }
    info!("Control panel stopped");

    result
}

/// Main event loop for the control panel.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    commands: &mpsc::Sender<Command>,
    events: &mut mpsc::Receiver<RigEvent>,
) -> Result<()> {
    while !app.should_quit() {
        app.clean_expired_messages();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code, app.has_overlay());
            if let Some(cmd) = input::apply_action(app, action)
                && commands.try_send(cmd).is_err()
            {
                app.push_status_message("Rig worker is busy, try again".to_string());
            }
        }

        drain_events(app, events);
    }

    Ok(())
}

/// Fold every event already queued into `app` without waiting.
fn drain_events(app: &mut App, events: &mut mpsc::Receiver<RigEvent>) -> usize {
    let mut drained = 0;
    while let Ok(event) = events.try_recv() {
        app.handle_rig_event(event);
        drained += 1;
    }
    drained
}
