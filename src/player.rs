//! Playback core: the play queue, transport control, engine event
//! reconciliation and the status line formatter.
//!
//! The input thread drives `PlaybackController` directly; the engine's
//! events are folded in by `EventReconciler` on its own thread. Both share
//! the controller through `Arc<Mutex<_>>`, and everything the UI shows is
//! pushed out through `Renderer`.

mod controller;
mod queue;
mod reconciler;
mod status;
mod types;

pub use controller::*;
pub use queue::*;
pub use reconciler::*;
pub use status::*;
pub use types::*;

#[cfg(test)]
mod tests;
