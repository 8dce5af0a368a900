// Command action table: keystroke patterns mapped to editor commands.

use std::collections::HashMap;

use super::EditMode;
use crate::caret::VerticalDirection;

/// Direction of a horizontal move or deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    /// Toward the end of the document.
    Forward,
    /// Toward the start of the document.
    Backward,
}

impl HorizontalDirection {
    pub fn is_backward(self) -> bool {
        self == HorizontalDirection::Backward
    }
}

/// A semantic editor action with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Switch to the given mode.
    ModeChange(EditMode),
    /// Move the caret one character.
    MoveHorizontal(HorizontalDirection),
    /// Move the caret to the adjacent visual line, keeping its column.
    MoveVertical(VerticalDirection),
    /// Delete one character next to the caret.
    DeleteCharacter(HorizontalDirection),
    /// Delete to the word boundary.
    DeleteWord(HorizontalDirection),
    /// Delete the visual line under the caret.
    DeleteLine,
    /// Revert the last edit.
    Undo,
    /// Reapply the last reverted edit.
    Redo,
    /// Re-focus the editor and resync the cursor.
    Focus,
}

impl EditorCommand {
    /// Every name accepted in `[keys]` bindings.
    pub const NAMES: &'static [&'static str] = &[
        "move-forward",
        "move-backward",
        "move-down",
        "move-up",
        "set-edit-mode",
        "set-command-mode",
        "delete-character",
        "delete-character-backward",
        "delete-word",
        "delete-word-backward",
        "delete-line",
        "undo",
        "redo",
        "focus",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        use HorizontalDirection::{Backward, Forward};
        let command = match name {
            "move-forward" => EditorCommand::MoveHorizontal(Forward),
            "move-backward" => EditorCommand::MoveHorizontal(Backward),
            "move-down" => EditorCommand::MoveVertical(VerticalDirection::Down),
            "move-up" => EditorCommand::MoveVertical(VerticalDirection::Up),
            "set-edit-mode" => EditorCommand::ModeChange(EditMode::Edit),
            "set-command-mode" => EditorCommand::ModeChange(EditMode::Command),
            "delete-character" => EditorCommand::DeleteCharacter(Forward),
            "delete-character-backward" => EditorCommand::DeleteCharacter(Backward),
            "delete-word" => EditorCommand::DeleteWord(Forward),
            "delete-word-backward" => EditorCommand::DeleteWord(Backward),
            "delete-line" => EditorCommand::DeleteLine,
            "undo" => EditorCommand::Undo,
            "redo" => EditorCommand::Redo,
            "focus" => EditorCommand::Focus,
            _ => return None,
        };
        Some(command)
    }

    /// The binding name of this command.
    pub fn name(&self) -> &'static str {
        use HorizontalDirection::{Backward, Forward};
        match self {
            EditorCommand::MoveHorizontal(Forward) => "move-forward",
            EditorCommand::MoveHorizontal(Backward) => "move-backward",
            EditorCommand::MoveVertical(VerticalDirection::Down) => "move-down",
            EditorCommand::MoveVertical(VerticalDirection::Up) => "move-up",
            EditorCommand::ModeChange(EditMode::Edit) => "set-edit-mode",
            EditorCommand::ModeChange(EditMode::Command) => "set-command-mode",
            EditorCommand::DeleteCharacter(Forward) => "delete-character",
            EditorCommand::DeleteCharacter(Backward) => "delete-character-backward",
            EditorCommand::DeleteWord(Forward) => "delete-word",
            EditorCommand::DeleteWord(Backward) => "delete-word-backward",
            EditorCommand::DeleteLine => "delete-line",
            EditorCommand::Undo => "undo",
            EditorCommand::Redo => "redo",
            EditorCommand::Focus => "focus",
        }
    }
}

/// A literal key sequence and the command it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPattern {
    pub pattern: String,
    pub command: EditorCommand,
}

impl CommandPattern {
    pub fn new(pattern: &str, command: EditorCommand) -> Self {
        Self {
            pattern: pattern.to_string(),
            command,
        }
    }
}

/// The registered command patterns, built once at startup.
#[derive(Debug, Clone)]
pub struct CommandTable {
    patterns: Vec<CommandPattern>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    /// The built-in vim bindings.
    pub fn new() -> Self {
        use HorizontalDirection::{Backward, Forward};
        let patterns = vec![
            CommandPattern::new("l", EditorCommand::MoveHorizontal(Forward)),
            CommandPattern::new("h", EditorCommand::MoveHorizontal(Backward)),
            CommandPattern::new("j", EditorCommand::MoveVertical(VerticalDirection::Down)),
            CommandPattern::new("k", EditorCommand::MoveVertical(VerticalDirection::Up)),
            CommandPattern::new("i", EditorCommand::ModeChange(EditMode::Edit)),
            CommandPattern::new("x", EditorCommand::DeleteCharacter(Forward)),
            CommandPattern::new("dw", EditorCommand::DeleteWord(Forward)),
            CommandPattern::new("dd", EditorCommand::DeleteLine),
            CommandPattern::new("u", EditorCommand::Undo),
        ];
        Self { patterns }
    }

    /// Built-in bindings plus user bindings (pattern → command name). A user
    /// pattern replaces a built-in one with the same keys.
    pub fn with_bindings(bindings: &HashMap<String, String>) -> Self {
        let mut table = Self::new();
        let mut entries: Vec<_> = bindings.iter().collect();
        entries.sort();
        for (pattern, name) in entries {
            match EditorCommand::from_name(name) {
                Some(command) if !pattern.is_empty() => table.bind(pattern, command),
                _ => log::warn!("Ignoring key binding '{pattern}' = '{name}'"),
            }
        }
        table
    }

    pub fn bind(&mut self, pattern: &str, command: EditorCommand) {
        match self.patterns.iter_mut().find(|p| p.pattern == pattern) {
            Some(existing) => existing.command = command,
            None => self.patterns.push(CommandPattern::new(pattern, command)),
        }
    }

    /// Exact match.
    pub fn lookup(&self, keys: &str) -> Option<EditorCommand> {
        self.patterns
            .iter()
            .find(|p| p.pattern == keys)
            .map(|p| p.command)
    }

    /// Whether `keys` begins at least one registered pattern.
    pub fn is_prefix(&self, keys: &str) -> bool {
        self.patterns.iter().any(|p| p.pattern.starts_with(keys))
    }

    pub fn patterns(&self) -> &[CommandPattern] {
        &self.patterns
    }
}
