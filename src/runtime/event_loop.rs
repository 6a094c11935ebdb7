use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus, Page, Selection, SharedView};
use crate::config;
use crate::player::{PlaybackController, QueueItem};
use crate::runtime::startup::Playback;
use crate::subsonic::{Entry, SubsonicConnection};
use crate::ui;

/// Everything the key handlers need besides the app model.
pub struct Context<'a> {
    pub settings: &'a config::Settings,
    pub connection: &'a SubsonicConnection,
    pub view: &'a SharedView,
    pub playback: Option<&'a Playback>,
}

impl Context<'_> {
    /// Run `f` on the controller; a no-op when playback is unavailable.
    fn with_controller<R>(&self, f: impl FnOnce(&mut PlaybackController) -> R) -> Option<R> {
        let playback = self.playback?;
        let mut controller = playback
            .controller
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Some(f(&mut controller))
    }
}

/// What the entry cursor asks for, detached from the borrowed directory.
enum EntryAction {
    Open(String),
    Play(QueueItem),
    AppendSong(QueueItem),
    AppendDirectory(Entry, String),
}

/// Main terminal event loop: handles input and redraws whenever the view or
/// an input changed something. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &Context<'_>,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut dirty = true;
    loop {
        if ctx.view.take_redraw() || dirty {
            let view = ctx.view.snapshot();
            app.clamp_queue_selection(view.queue.len());
            terminal.draw(|f| ui::draw(f, app, &view))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, ctx, app) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
    }

    tracing::info!("quit requested");
    Ok(())
}

/// Handle one key press. Returns true when the app should quit.
fn handle_key_event(key: KeyEvent, ctx: &Context<'_>, app: &mut App) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('1') => app.page = Page::Browser,
        KeyCode::Char('2') => app.page = Page::Queue,
        KeyCode::Char('D') => {
            ctx.with_controller(|c| c.clear());
        }
        KeyCode::Char('p') => {
            ctx.with_controller(|c| c.pause());
        }
        KeyCode::Char('-') => {
            let step = ctx.settings.playback.volume_step;
            ctx.with_controller(|c| c.adjust_volume(-step));
        }
        KeyCode::Char('=') => {
            let step = ctx.settings.playback.volume_step;
            ctx.with_controller(|c| c.adjust_volume(step));
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.next(ctx.view.queue_len()) {
                open_selected_artist(ctx.connection, ctx.view, app);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.prev() {
                open_selected_artist(ctx.connection, ctx.view, app);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => app.focus_entries(),
        KeyCode::Char('h') | KeyCode::Left => app.focus_artists(),
        KeyCode::Enter => handle_enter(ctx, app),
        KeyCode::Char('a') => handle_append(ctx, app),
        KeyCode::Char('d') | KeyCode::Delete => {
            if app.page == Page::Queue {
                let index = app.queue_selected;
                ctx.with_controller(|c| c.remove_at(index));
            }
        }
        _ => {}
    }

    false
}

fn handle_enter(ctx: &Context<'_>, app: &mut App) {
    if app.page != Page::Browser {
        return;
    }
    if app.focus == Focus::Artists {
        app.focus_entries();
        return;
    }

    let action = match app.selected_entity() {
        Some(Selection::Parent(id)) => EntryAction::Open(id.to_string()),
        Some(Selection::Directory(entry)) => EntryAction::Open(entry.id.clone()),
        Some(Selection::Song(entry)) => EntryAction::Play(QueueItem::from_entry(
            ctx.connection,
            entry,
            app.fallback_artist(),
        )),
        None => return,
    };
    apply(action, ctx, app);
}

fn handle_append(ctx: &Context<'_>, app: &mut App) {
    if app.page != Page::Browser || app.focus != Focus::Entries {
        return;
    }

    let action = match app.selected_entity() {
        Some(Selection::Song(entry)) => EntryAction::AppendSong(QueueItem::from_entry(
            ctx.connection,
            entry,
            app.fallback_artist(),
        )),
        Some(Selection::Directory(entry)) => {
            EntryAction::AppendDirectory(entry.clone(), app.fallback_artist().to_string())
        }
        Some(Selection::Parent(_)) | None => return,
    };
    apply(action, ctx, app);
}

fn apply(action: EntryAction, ctx: &Context<'_>, app: &mut App) {
    match action {
        EntryAction::Open(id) => open_directory(ctx.connection, ctx.view, app, &id),
        EntryAction::Play(item) => {
            ctx.with_controller(|c| c.play(&item.uri, &item.title, &item.artist));
        }
        EntryAction::AppendSong(item) => {
            ctx.with_controller(|c| c.append(item));
        }
        EntryAction::AppendDirectory(entry, fallback_artist) => {
            let result = ctx.playback.map(|playback| {
                PlaybackController::append_directory(
                    &playback.controller,
                    ctx.connection,
                    std::slice::from_ref(&entry),
                    &fallback_artist,
                )
            });
            match result {
                Some(Ok(added)) => {
                    tracing::info!(directory = %entry.title, added, "appended directory");
                    ctx.view.set_notice(None);
                }
                Some(Err(e)) => {
                    tracing::warn!(directory = %entry.title, error = %e, "failed to append directory");
                    ctx.view
                        .set_notice(Some(format!("could not add {}: {e}", entry.title)));
                }
                None => {}
            }
        }
    }
}

/// Resolve the selected artist's directory into the entry pane.
pub fn open_selected_artist(connection: &SubsonicConnection, view: &SharedView, app: &mut App) {
    let Some(id) = app.selected_artist().map(|a| a.id.clone()) else {
        return;
    };
    open_directory(connection, view, app, &id);
}

fn open_directory(connection: &SubsonicConnection, view: &SharedView, app: &mut App, id: &str) {
    match connection.get_music_directory(id) {
        Ok(directory) => {
            tracing::debug!(id, name = %directory.name, entries = directory.entries.len(), "opened directory");
            app.set_directory(directory);
            view.set_notice(None);
        }
        Err(e) => {
            tracing::warn!(id, error = %e, "failed to open directory");
            view.set_notice(Some(format!("could not open directory: {e}")));
        }
    }
}
