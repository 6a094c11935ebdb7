//! Application module: the browsing model and the shared view the TUI draws.
//!
//! `App` lives in `app::model` and holds the artist index, the directory
//! being shown and the cursors. `SharedView` in `app::view` receives queue
//! rows and playback text from the playback core.

mod model;
mod view;

pub use model::*;
pub use view::*;
