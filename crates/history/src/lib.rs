//! Undo/redo for scene edits.
//!
//! A [`Command`] is built against the current scene and stores, for every
//! element it touches, the state before and after the edit. The
//! [`History`] applies those snapshots to move forwards and backwards, so
//! undo never needs an inverse operation.

mod command;
mod error;
mod history;

pub use command::{Command, CommandKind};
pub use error::HistoryError;
pub use history::History;
