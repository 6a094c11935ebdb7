//! The play queue.
//!
//! Insertion order is playback order. While a track is loaded in the engine
//! it sits at position 0; the completion path pops it once it ends.

use crate::subsonic::{DirectoryBrowser, Entry, SubsonicError};

/// A pending playback item. Identity is positional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    pub uri: String,
    pub title: String,
    pub artist: String,
}

impl QueueItem {
    pub fn new(uri: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Build an item for a leaf `entry`, falling back to `fallback_artist`
    /// when the server did not tag one.
    pub fn from_entry(browser: &dyn DirectoryBrowser, entry: &Entry, fallback_artist: &str) -> Self {
        Self {
            uri: browser.play_url(entry),
            title: entry.display_title(),
            artist: entry.artist_or(fallback_artist).to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlayQueue {
    items: Vec<QueueItem>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn head(&self) -> Option<&QueueItem> {
        self.items.first()
    }

    pub fn append(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// Flatten `entries` depth-first and append every leaf.
    ///
    /// Directories are resolved through `browser` and contribute no item of
    /// their own. Nothing is appended if any resolution fails. Returns the
    /// number of appended items.
    pub fn append_directory(
        &mut self,
        browser: &dyn DirectoryBrowser,
        entries: &[Entry],
        fallback_artist: &str,
    ) -> Result<usize, SubsonicError> {
        let leaves = Self::resolve_leaves(browser, entries, fallback_artist)?;
        let added = leaves.len();
        self.extend(leaves);
        Ok(added)
    }

    /// The items `append_directory` would append, without touching a queue.
    pub fn resolve_leaves(
        browser: &dyn DirectoryBrowser,
        entries: &[Entry],
        fallback_artist: &str,
    ) -> Result<Vec<QueueItem>, SubsonicError> {
        let mut leaves = Vec::new();
        collect_leaves(browser, entries, fallback_artist, &mut leaves)?;
        Ok(leaves)
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = QueueItem>) {
        self.items.extend(items);
    }

    /// Remove the item at `index`; out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<QueueItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop the head after its track finished.
    pub(crate) fn pop_head(&mut self) -> Option<QueueItem> {
        self.remove_at(0)
    }

    /// Put `item` in front of everything else.
    pub(crate) fn push_head(&mut self, item: QueueItem) {
        self.items.insert(0, item);
    }

    /// Swap the head for `item`, or insert it when the queue is empty.
    pub(crate) fn replace_head(&mut self, item: QueueItem) {
        match self.items.first_mut() {
            Some(head) => *head = item,
            None => self.items.push(item),
        }
    }
}

fn collect_leaves(
    browser: &dyn DirectoryBrowser,
    entries: &[Entry],
    fallback_artist: &str,
    out: &mut Vec<QueueItem>,
) -> Result<(), SubsonicError> {
    for entry in entries {
        if entry.is_dir {
            let directory = browser.resolve(&entry.id)?;
            collect_leaves(browser, &directory.entries, fallback_artist, out)?;
        } else {
            out.push(QueueItem::from_entry(browser, entry, fallback_artist));
        }
    }
    Ok(())
}
