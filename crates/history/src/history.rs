use crate::{Command, CommandKind, HistoryError};
use log::debug;
use scene_graph::{ChangeSink, SceneGraph};
use std::collections::VecDeque;

/// Undo and redo stacks over [`Command`]s.
///
/// Capacity is unbounded unless set; when bounded, the oldest undo entries
/// are evicted first.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    capacity: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Changes the maximum undo depth, evicting right away if the stack is
    /// already deeper.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        self.evict();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Kind of the command the next undo would revert.
    pub fn peek_undo(&self) -> Option<CommandKind> {
        self.undo.back().map(Command::kind)
    }

    pub fn peek_redo(&self) -> Option<CommandKind> {
        self.redo.last().map(Command::kind)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Applies a command's forward states and records it. Any redo entries
    /// are discarded.
    pub fn execute(
        &mut self,
        command: Command,
        scene: &mut SceneGraph,
        sink: &mut dyn ChangeSink,
    ) -> Result<(), HistoryError> {
        scene.apply_states(command.after(), sink)?;
        debug!(
            "executed {} on {} element(s)",
            command.kind(),
            command.after().len()
        );
        self.undo.push_back(command);
        self.redo.clear();
        self.evict();
        Ok(())
    }

    /// Reverts the most recent command.
    pub fn undo(&mut self, scene: &mut SceneGraph, sink: &mut dyn ChangeSink) -> Result<CommandKind, HistoryError> {
        let command = self.undo.pop_back().ok_or(HistoryError::NothingToUndo)?;
        if let Err(err) = scene.apply_states(command.before(), sink) {
            self.undo.push_back(command);
            return Err(err.into());
        }
        let kind = command.kind();
        debug!("undid {}", kind);
        self.redo.push(command);
        Ok(kind)
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self, scene: &mut SceneGraph, sink: &mut dyn ChangeSink) -> Result<CommandKind, HistoryError> {
        let command = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        if let Err(err) = scene.apply_states(command.after(), sink) {
            self.redo.push(command);
            return Err(err.into());
        }
        let kind = command.kind();
        debug!("redid {}", kind);
        self.undo.push_back(command);
        self.evict();
        Ok(kind)
    }

    fn evict(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.undo.len() > capacity {
            if let Some(evicted) = self.undo.pop_front() {
                debug!("history full, dropping oldest {}", evicted.kind());
            }
        }
    }
}
