//! Application model types: `App`, `Page`, `Focus` and `Selection`.
//!
//! The `App` struct holds the browsing state the terminal owns: the artist
//! index, the directory being shown and the cursor positions. Queue rows and
//! playback text live in the shared view instead, since the playback core
//! pushes them from its own thread.

use crate::subsonic::{Artist, Directory, Entry};

/// Label of the row that leads to the parent directory.
pub const PARENT_ROW: &str = "[..]";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Browser,
    Queue,
}

/// Which pane of the browser page receives movement keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Artists,
    Entries,
}

/// What the entry cursor points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The `[..]` row; carries the parent directory id.
    Parent(&'a str),
    Directory(&'a Entry),
    Song(&'a Entry),
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub artists: Vec<Artist>,
    pub artist_selected: usize,
    pub directory: Option<Directory>,
    pub entity_selected: usize,
    pub queue_selected: usize,
    pub page: Page,
    pub focus: Focus,
}

impl App {
    /// Create a new `App` over the server's artist index.
    pub fn new(artists: Vec<Artist>) -> Self {
        Self {
            artists,
            ..Self::default()
        }
    }

    pub fn selected_artist(&self) -> Option<&Artist> {
        self.artists.get(self.artist_selected)
    }

    /// Show `directory` in the entry pane with the cursor on the first row.
    pub fn set_directory(&mut self, directory: Directory) {
        self.directory = Some(directory);
        self.entity_selected = 0;
    }

    fn has_parent_row(&self) -> bool {
        self.directory
            .as_ref()
            .is_some_and(|d| d.parent.is_some())
    }

    /// Number of rows in the entry pane, `[..]` included.
    pub fn entity_row_count(&self) -> usize {
        match &self.directory {
            Some(d) => d.entries.len() + usize::from(self.has_parent_row()),
            None => 0,
        }
    }

    /// Display text of every entry row.
    pub fn entity_rows(&self) -> Vec<String> {
        let Some(directory) = &self.directory else {
            return Vec::new();
        };

        let mut rows = Vec::with_capacity(self.entity_row_count());
        if directory.parent.is_some() {
            rows.push(PARENT_ROW.to_string());
        }
        rows.extend(directory.entries.iter().map(|entry| {
            if entry.is_dir {
                format!("[{}]", entry.title)
            } else {
                entry.display_title()
            }
        }));
        rows
    }

    /// Resolve the entry cursor, accounting for the `[..]` row.
    pub fn selected_entity(&self) -> Option<Selection<'_>> {
        let directory = self.directory.as_ref()?;
        let mut index = self.entity_selected;

        if let Some(parent) = directory.parent.as_deref() {
            if index == 0 {
                return Some(Selection::Parent(parent));
            }
            index -= 1;
        }

        let entry = directory.entries.get(index)?;
        Some(if entry.is_dir {
            Selection::Directory(entry)
        } else {
            Selection::Song(entry)
        })
    }

    /// Artist name used for songs the server left untagged.
    pub fn fallback_artist(&self) -> &str {
        self.directory
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or_default()
    }

    pub fn focus_entries(&mut self) {
        if self.page == Page::Browser {
            self.focus = Focus::Entries;
        }
    }

    pub fn focus_artists(&mut self) {
        if self.page == Page::Browser {
            self.focus = Focus::Artists;
        }
    }

    /// Move the active cursor down. Returns true when the artist selection
    /// changed and its directory needs resolving.
    pub fn next(&mut self, queue_len: usize) -> bool {
        match (self.page, self.focus) {
            (Page::Queue, _) => {
                self.queue_selected = step_down(self.queue_selected, queue_len);
                false
            }
            (Page::Browser, Focus::Entries) => {
                self.entity_selected = step_down(self.entity_selected, self.entity_row_count());
                false
            }
            (Page::Browser, Focus::Artists) => {
                let before = self.artist_selected;
                self.artist_selected = step_down(before, self.artists.len());
                self.artist_selected != before
            }
        }
    }

    /// Move the active cursor up. Same return value as `next`.
    pub fn prev(&mut self) -> bool {
        match (self.page, self.focus) {
            (Page::Queue, _) => {
                self.queue_selected = self.queue_selected.saturating_sub(1);
                false
            }
            (Page::Browser, Focus::Entries) => {
                self.entity_selected = self.entity_selected.saturating_sub(1);
                false
            }
            (Page::Browser, Focus::Artists) => {
                let before = self.artist_selected;
                self.artist_selected = before.saturating_sub(1);
                self.artist_selected != before
            }
        }
    }

    /// Keep the queue cursor on a row after the queue shrank.
    pub fn clamp_queue_selection(&mut self, queue_len: usize) {
        self.queue_selected = self.queue_selected.min(queue_len.saturating_sub(1));
    }
}

fn step_down(current: usize, len: usize) -> usize {
    if current + 1 < len { current + 1 } else { current }
}
