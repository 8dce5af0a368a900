// Vim modal state: the edit mode, the pending keystroke buffer and the
// remembered horizontal anchor. Keydown events are matched against the
// command table and matched commands are dispatched on the command bus.

pub mod command;

use std::fmt;

use crate::bus::Dispatcher;
use crate::input::{KeyEvent, NamedKey};
use command::{CommandTable, EditorCommand};

/// Whether keystrokes are intercepted as commands or passed through as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Keys are matched against command patterns.
    #[default]
    Command,
    /// Keys insert text; only Ctrl+[ is intercepted.
    Edit,
}

impl EditMode {
    /// Mode indicator text for status display.
    pub fn mode_text(self) -> &'static str {
        match self {
            EditMode::Command => "-- COMMAND --",
            EditMode::Edit => "-- EDIT --",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Command => write!(f, "command"),
            EditMode::Edit => write!(f, "edit"),
        }
    }
}

/// Keys typed in Command mode that have not yet matched a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeystrokeBuffer {
    keys: String,
}

impl KeystrokeBuffer {
    pub fn push(&mut self, key: &str) {
        self.keys.push_str(key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// What became of a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not intercepted; the host handles the key natively.
    PassThrough,
    /// A command was dispatched.
    Dispatched(EditorCommand),
    /// A partial pattern; waiting for more keys.
    Pending,
    /// Consumed by matching but produced nothing.
    Swallowed,
}

impl KeyOutcome {
    pub fn handled(&self) -> bool {
        matches!(self, KeyOutcome::Dispatched(_) | KeyOutcome::Pending)
    }

    /// Whether the host's default key action must be suppressed.
    pub fn prevents_default(&self) -> bool {
        !matches!(self, KeyOutcome::PassThrough)
    }
}

/// Modal state for one editor instance.
#[derive(Debug, Clone)]
pub struct Vim {
    mode: EditMode,
    keystrokes: KeystrokeBuffer,
    horizontal: Option<f64>,
    table: CommandTable,
}

impl Default for Vim {
    fn default() -> Self {
        Self::new(CommandTable::new())
    }
}

impl Vim {
    pub fn new(table: CommandTable) -> Self {
        Self {
            mode: EditMode::default(),
            keystrokes: KeystrokeBuffer::default(),
            horizontal: None,
            table,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Apply a mode switch. Any partial sequence is discarded.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.keystrokes.clear();
    }

    pub fn pending_keys(&self) -> &str {
        self.keystrokes.as_str()
    }

    /// Remembered x-coordinate for vertical motion.
    pub fn horizontal(&self) -> Option<f64> {
        self.horizontal
    }

    pub fn set_horizontal(&mut self, x: f64) {
        self.horizontal = Some(x);
    }

    pub fn reset_horizontal(&mut self) {
        self.horizontal = None;
    }

    /// Resolve a keydown. Mode changes are dispatched, not applied here; the
    /// bus owner applies them with [`Vim::set_mode`].
    pub fn handle_keydown(
        &mut self,
        event: &KeyEvent,
        dispatcher: &Dispatcher<EditorCommand>,
    ) -> KeyOutcome {
        let key = event.key_str();
        let mods = event.modifiers;

        if self.mode == EditMode::Edit {
            if mods.ctrl && key == "[" {
                self.keystrokes.clear();
                return self.dispatch(EditorCommand::ModeChange(EditMode::Command), dispatcher);
            }
            return KeyOutcome::PassThrough;
        }

        if event.is(NamedKey::Escape) {
            self.keystrokes.clear();
            return KeyOutcome::PassThrough;
        }

        if mods.ctrl && key == "r" {
            self.keystrokes.clear();
            return self.dispatch(EditorCommand::Redo, dispatcher);
        }

        // OS and host shortcuts.
        if mods.has_command_modifier() {
            return KeyOutcome::PassThrough;
        }

        self.keystrokes.push(key);
        let keys = self.keystrokes.as_str();

        if let Some(command) = self.table.lookup(keys) {
            self.keystrokes.clear();
            return self.dispatch(command, dispatcher);
        }

        if self.table.is_prefix(keys) {
            return KeyOutcome::Pending;
        }

        log::debug!("Discarding unmatched keys '{keys}'");
        self.keystrokes.clear();
        KeyOutcome::Swallowed
    }

    fn dispatch(
        &self,
        command: EditorCommand,
        dispatcher: &Dispatcher<EditorCommand>,
    ) -> KeyOutcome {
        dispatcher.dispatch(command);
        KeyOutcome::Dispatched(command)
    }
}
