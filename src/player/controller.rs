//! Transport control over the playback engine.
//!
//! `PlaybackController` owns the play queue and the transport state. It is
//! shared between the input thread and the event reconciler behind a single
//! mutex, so every mutation below runs with exclusive access.
//!
//! Every load is numbered (`LoadId`) and the engine tags its start and end
//! events with that number. `head_load` names the load whose end-of-file
//! pops the head; events for any other load are stale. Stopping keeps
//! `head_load` until that end-of-file arrives, so the stopped head is "on its
//! way out" meanwhile. Actions that discard the head eagerly clear it.

use std::sync::{Arc, Mutex, PoisonError};

use crate::audio::{LoadId, PlaybackEngine};
use crate::subsonic::{DirectoryBrowser, Entry, SubsonicError};

use super::queue::{PlayQueue, QueueItem};
use super::types::{QueueEntry, Renderer, TransportState};

pub const MAX_VOLUME: i64 = 100;

pub struct PlaybackController {
    queue: PlayQueue,
    transport: TransportState,
    volume: i64,
    loads: LoadId,
    head_load: Option<LoadId>,
    engine: Arc<dyn PlaybackEngine>,
    renderer: Arc<dyn Renderer>,
}

impl PlaybackController {
    /// Create a controller and push `initial_volume` (clamped) to the engine.
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        renderer: Arc<dyn Renderer>,
        initial_volume: i64,
    ) -> Self {
        let volume = initial_volume.clamp(0, MAX_VOLUME);
        engine.set_volume(volume);
        Self {
            queue: PlayQueue::new(),
            transport: TransportState::Stopped,
            volume,
            loads: 0,
            head_load: None,
            engine,
            renderer,
        }
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    /// Whether the engine currently holds a resource (playing or paused).
    pub fn is_loaded(&self) -> bool {
        self.transport != TransportState::Stopped
    }

    /// Title of the loaded track, if any.
    pub fn current_title(&self) -> Option<&str> {
        if self.is_loaded() {
            self.queue.head().map(|item| item.title.as_str())
        } else {
            None
        }
    }

    pub fn append(&mut self, item: QueueItem) {
        self.queue.append(item);
        self.push_queue();
    }

    /// Append already resolved items in order. Returns how many were added.
    pub fn append_items(&mut self, items: Vec<QueueItem>) -> usize {
        let added = items.len();
        if added > 0 {
            self.queue.extend(items);
            self.push_queue();
        }
        added
    }

    /// Append every leaf reachable from `entries`, resolving directories
    /// through `browser`.
    ///
    /// Resolution talks to the server, so it runs before `shared` is locked;
    /// the lock is only taken to append the result.
    pub fn append_directory(
        shared: &Mutex<Self>,
        browser: &dyn DirectoryBrowser,
        entries: &[Entry],
        fallback_artist: &str,
    ) -> Result<usize, SubsonicError> {
        let items = PlayQueue::resolve_leaves(browser, entries, fallback_artist)?;
        let mut controller = shared.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(controller.append_items(items))
    }

    /// Whether the head was stopped and waits for its end-of-file.
    fn stop_pending(&self) -> bool {
        !self.is_loaded() && self.head_load.is_some()
    }

    /// Remove a queue item on user request.
    ///
    /// The loaded head is never removed structurally: the engine is told to
    /// stop, and the end-of-file it reports pops the head and advances.
    pub fn remove_at(&mut self, index: usize) {
        if index >= self.queue.len() {
            return;
        }

        if index == 0 {
            if self.is_loaded() {
                self.stop();
                return;
            }
            if self.stop_pending() {
                // Already leaving through the completion path.
                return;
            }
        }

        if self.queue.remove_at(index).is_some() {
            self.push_queue();
        }
    }

    /// Empty the queue and release whatever the engine has loaded.
    pub fn clear(&mut self) {
        self.queue.clear();
        if self.is_loaded() {
            self.stop();
        }
        self.head_load = None;
        self.push_queue();
    }

    /// Play a track right now, independent of queue order.
    ///
    /// The new item becomes the loaded head: it replaces the current head
    /// while something is loaded, otherwise it goes in front of the queue.
    pub fn play(&mut self, uri: &str, title: &str, artist: &str) {
        let item = QueueItem::new(uri, title, artist);
        if self.is_loaded() {
            self.queue.replace_head(item);
        } else {
            if self.stop_pending() {
                self.queue.pop_head();
            }
            self.queue.push_head(item);
        }

        tracing::info!(title, artist, "play now");
        self.load(uri);
        self.push_queue();
        self.push_transport();
    }

    /// Load the current head, if any. Called after the finished head was popped.
    pub fn play_next_track(&mut self) {
        let Some(next) = self.queue.head() else {
            return;
        };

        tracing::debug!(title = %next.title, "advancing to next track");
        let uri = next.uri.clone();
        self.load(&uri);
    }

    fn load(&mut self, uri: &str) {
        self.loads += 1;
        self.head_load = Some(self.loads);
        self.engine.load_and_play(uri);
        self.transport = TransportState::Playing;
    }

    /// Ask the engine to stop. The queue is left alone.
    pub fn stop(&mut self) {
        if !self.is_loaded() {
            return;
        }
        self.engine.stop();
        self.transport = TransportState::Stopped;
        self.push_transport();
    }

    /// Toggle pause on the loaded track and return the resulting state.
    pub fn pause(&mut self) -> TransportState {
        self.transport = match self.transport {
            TransportState::Stopped => return TransportState::Stopped,
            TransportState::Playing => {
                self.engine.set_paused(true);
                TransportState::Paused
            }
            TransportState::Paused => {
                self.engine.set_paused(false);
                TransportState::Playing
            }
        };
        self.push_transport();
        self.transport
    }

    /// Change the volume by `delta` percent, clamped to `0..=100`.
    pub fn adjust_volume(&mut self, delta: i64) -> i64 {
        let volume = self.volume.saturating_add(delta).clamp(0, MAX_VOLUME);
        if volume != self.volume {
            self.volume = volume;
            self.engine.set_volume(volume);
        }
        self.volume
    }

    /// Engine reported that `load` started. The transport was already set
    /// when the load was issued, and a pause or stop since then wins.
    pub(super) fn on_start_file(&mut self, load: LoadId) {
        if self.head_load != Some(load) || !self.is_loaded() {
            tracing::debug!(load, "ignoring start of a superseded or stopped load");
            return;
        }
        self.push_transport();
    }

    /// Engine reported that `load` ended, was stopped or failed.
    pub(super) fn on_end_file(&mut self, load: LoadId) {
        if self.head_load != Some(load) {
            tracing::debug!(load, "ignoring end-of-file for an already discarded track");
            return;
        }

        self.head_load = None;
        self.transport = TransportState::Stopped;
        if let Some(finished) = self.queue.pop_head() {
            tracing::debug!(title = %finished.title, "track finished");
        }
        self.play_next_track();
        self.push_queue();
        self.push_transport();
    }

    fn push_queue(&self) {
        let entries = self.queue.items().iter().map(QueueEntry::from).collect();
        self.renderer.update_queue_display(entries);
    }

    fn push_transport(&self) {
        self.renderer
            .update_transport_label(self.transport, self.current_title());
    }
}
