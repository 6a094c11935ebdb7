use anyhow::{Context as _, anyhow};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, SharedView};
use crate::logging;
use crate::subsonic::SubsonicConnection;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> anyhow::Result<()> {
    let (settings, fallback) = settings::load_settings();

    let (_log_guard, log_dir) = logging::init(&settings.logging)?;
    if let Some(reason) = &fallback {
        tracing::warn!("{reason}");
    }

    let host = settings.require_host().map_err(|msg| match &fallback {
        Some(reason) => anyhow!("{msg} ({reason})"),
        None => anyhow!(msg),
    })?;
    tracing::info!(host, log_dir = %log_dir.display(), "starting stmp");

    let connection = SubsonicConnection::new(&settings.server, &settings.auth);
    connection
        .ping()
        .with_context(|| format!("could not reach the Subsonic server at {host}"))?;
    let artists = connection
        .get_indexes()
        .context("could not load the artist index")?;
    tracing::info!(artists = artists.len(), "artist index loaded");

    let view = SharedView::new(settings.playback.initial_volume);
    let playback = startup::start_playback(&settings, &view);

    let mut app = App::new(artists);
    event_loop::open_selected_artist(&connection, &view, &mut app);

    let ctx = event_loop::Context {
        settings: &settings,
        connection: &connection,
        view: &view,
        playback: playback.as_ref(),
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &ctx, &mut app);

    let restore_result: anyhow::Result<()> = (|| {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    })();

    if let Some(playback) = playback {
        playback.shutdown();
    }

    restore_result?;
    run_result
}
