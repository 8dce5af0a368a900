// Keyboard input: key events with modifiers, and Vim-style key notation
// ("dw", "<Esc>", "<C-[>") for scripted sessions and tests.

use regex::Regex;
use std::sync::OnceLock;

/// Non-character keys the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Escape,
    Enter,
    Backspace,
    Tab,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

impl NamedKey {
    /// The key's name as a host keyboard event reports it.
    pub fn as_str(self) -> &'static str {
        match self {
            NamedKey::Escape => "Escape",
            NamedKey::Enter => "Enter",
            NamedKey::Backspace => "Backspace",
            NamedKey::Tab => "Tab",
            NamedKey::Delete => "Delete",
            NamedKey::ArrowUp => "ArrowUp",
            NamedKey::ArrowDown => "ArrowDown",
            NamedKey::ArrowLeft => "ArrowLeft",
            NamedKey::ArrowRight => "ArrowRight",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
        }
    }
}

/// A logical key: the produced text, or a named key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Text produced by the key, e.g. `"d"` or `"["`.
    Character(String),
    /// A non-printing key.
    Named(NamedKey),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Ctrl, Meta or Alt: the modifiers reserved for OS and host shortcuts.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// A single key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key pressed.
    pub key: Key,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Unmodified character key.
    pub fn char(ch: char) -> Self {
        Self {
            key: Key::Character(ch.to_string()),
            modifiers: Modifiers::default(),
        }
    }

    /// Ctrl+character.
    pub fn ctrl(ch: char) -> Self {
        Self {
            key: Key::Character(ch.to_string()),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn named(key: NamedKey) -> Self {
        Self {
            key: Key::Named(key),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The key symbol as a string: the character text, or the named key.
    pub fn key_str(&self) -> &str {
        match &self.key {
            Key::Character(s) => s,
            Key::Named(named) => named.as_str(),
        }
    }

    pub fn is(&self, named: NamedKey) -> bool {
        self.key == Key::Named(named)
    }
}

/// Errors from parsing key notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unknown key name '<{0}>'")]
    UnknownKey(String),
}

fn notation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<([^<>]+)>|.").expect("key notation pattern is valid"))
}

/// Parse a key sequence such as `"jjdw<C-[>x<Esc>"`.
///
/// Bracketed names: `Esc`, `CR`/`Enter`, `BS`, `Tab`, `Del`, `Up`, `Down`,
/// `Left`, `Right`, `Home`, `End`, `lt` (a literal `<`), or a single
/// character. Prefixes `C-`, `M-`/`D-` (meta), `A-` and `S-` add modifiers.
/// An unmatched `<` is a literal character.
pub fn parse_key_sequence(notation: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    notation_regex()
        .captures_iter(notation)
        .map(|caps| match caps.get(1) {
            Some(inner) => parse_bracketed(inner.as_str()),
            None => Ok(KeyEvent::char(
                caps[0].chars().next().unwrap_or_default(),
            )),
        })
        .collect()
}

fn parse_bracketed(inner: &str) -> Result<KeyEvent, KeyParseError> {
    let mut modifiers = Modifiers::default();
    let mut rest = inner;
    while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
        match rest.as_bytes()[0].to_ascii_uppercase() {
            b'C' => modifiers.ctrl = true,
            b'M' | b'D' => modifiers.meta = true,
            b'A' => modifiers.alt = true,
            b'S' => modifiers.shift = true,
            _ => break,
        }
        rest = &rest[2..];
    }

    let key = match rest.to_ascii_lowercase().as_str() {
        "esc" | "escape" => Key::Named(NamedKey::Escape),
        "cr" | "enter" | "return" => Key::Named(NamedKey::Enter),
        "bs" | "backspace" => Key::Named(NamedKey::Backspace),
        "tab" => Key::Named(NamedKey::Tab),
        "del" | "delete" => Key::Named(NamedKey::Delete),
        "up" => Key::Named(NamedKey::ArrowUp),
        "down" => Key::Named(NamedKey::ArrowDown),
        "left" => Key::Named(NamedKey::ArrowLeft),
        "right" => Key::Named(NamedKey::ArrowRight),
        "home" => Key::Named(NamedKey::Home),
        "end" => Key::Named(NamedKey::End),
        "lt" => Key::Character("<".to_string()),
        "space" => Key::Character(" ".to_string()),
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if modifiers.shift => {
                    Key::Character(ch.to_uppercase().collect())
                }
                (Some(ch), None) => Key::Character(ch.to_string()),
                _ => return Err(KeyParseError::UnknownKey(inner.to_string())),
            }
        }
    };

    Ok(KeyEvent { key, modifiers })
}
