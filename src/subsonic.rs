//! Subsonic directory browsing.
//!
//! The playback core only needs two things from the server: resolving a
//! location id into its children, and a URL to stream a song. Both sit
//! behind `DirectoryBrowser` so the core can be exercised without a server.

mod client;
mod error;
mod model;

pub use client::SubsonicConnection;
pub use error::SubsonicError;
pub use model::{Artist, Directory, Entry};

pub trait DirectoryBrowser {
    /// Resolve a location id into its children, parent and display name.
    fn resolve(&self, id: &str) -> Result<Directory, SubsonicError>;

    /// Playable URI for a leaf entry.
    fn play_url(&self, entry: &Entry) -> String;
}
