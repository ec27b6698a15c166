//! The editor controller.
//!
//! [`Editor`] ties the scene graph, undo history and selection together and
//! turns input into recorded edits:
//!
//! - pointer gestures ([`Editor::pointer_down`] / `pointer_move` /
//!   `pointer_up`) select, marquee, move and draw shapes with the active
//!   [`Tool`];
//! - key presses ([`Editor::key_down`]) nudge, delete, group, reorder, undo
//!   and redo;
//! - scripted [`Action`]s cover the same ground from JSON.
//!
//! The editor never draws. A [`RenderSink`] hears about every scene change
//! and selection change, in order, and draws however it likes.
//!
//! Saving and loading go through [`SaveJob`] and [`LoadJob`], which run
//! against any [`project::DocumentStore`]. While one is in flight every edit
//! fails with [`EditorError::Busy`].

pub mod action;
mod config;
mod editor;
mod error;
mod executor;
mod gesture;
mod hit_test;
mod input;
mod io;
mod render;
mod selection;
mod tools;

pub use action::{Action, ActionResult, Paint, StrokeValue, Target};
pub use config::{EditorConfig, NudgeSteps};
pub use editor::Editor;
pub use error::{ConfigError, EditorError};
pub use gesture::{shape_between, Gesture, Preview};
pub use hit_test::{elements_in_rect, hit_test, hit_test_all};
pub use input::{Key, KeyEvent, Modifiers, PointerEvent};
pub use io::{LoadJob, Loaded, SaveJob};
pub use render::{NullRenderer, RecordingRenderer, RenderEvent, RenderSink};
pub use selection::Selection;
pub use tools::Tool;
