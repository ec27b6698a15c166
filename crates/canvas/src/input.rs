use node::Point;

/// Modifier keys held during an input event. `command` is Ctrl, or Cmd
/// on macOS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub command: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        command: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn command() -> Self {
        Self {
            command: true,
            ..Self::NONE
        }
    }

    pub fn command_shift() -> Self {
        Self {
            shift: true,
            command: true,
            ..Self::NONE
        }
    }
}

/// A pointer press, drag or release in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// What a key press asks the editor to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Shortcut {
    Cancel,
    DeleteSelection,
    Nudge { dx: f64, dy: f64, large: bool },
    Undo,
    Redo,
    SelectAll,
    Group,
    Ungroup,
    BringForward,
    SendBackward,
    Tool(crate::Tool),
}

impl KeyEvent {
    pub(crate) fn shortcut(&self) -> Option<Shortcut> {
        let Modifiers { shift, command, .. } = self.modifiers;
        let shortcut = match self.key {
            Key::Escape => Shortcut::Cancel,
            Key::Delete | Key::Backspace => Shortcut::DeleteSelection,
            Key::ArrowLeft => nudge(-1.0, 0.0, shift),
            Key::ArrowRight => nudge(1.0, 0.0, shift),
            Key::ArrowUp => nudge(0.0, -1.0, shift),
            Key::ArrowDown => nudge(0.0, 1.0, shift),
            Key::Char(c) if command => match (c.to_ascii_lowercase(), shift) {
                ('z', false) => Shortcut::Undo,
                ('z', true) | ('y', false) => Shortcut::Redo,
                ('a', false) => Shortcut::SelectAll,
                ('g', false) => Shortcut::Group,
                ('g', true) => Shortcut::Ungroup,
                _ => return None,
            },
            Key::Char(']') => Shortcut::BringForward,
            Key::Char('[') => Shortcut::SendBackward,
            Key::Char(c) => Shortcut::Tool(crate::Tool::from_shortcut(c)?),
        };
        Some(shortcut)
    }
}

fn nudge(dx: f64, dy: f64, large: bool) -> Shortcut {
    Shortcut::Nudge { dx, dy, large }
}
