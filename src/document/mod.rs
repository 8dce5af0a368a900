// Text document mutation capability: the editing primitives the modal core
// drives. Selection and geometry queries live on the selection port.

/// Mutations at the live selection. Each returns whether the document or
/// selection changed; a `false` is a no-op, not an error.
pub trait TextDocument {
    /// Move the caret one character, crossing paragraph boundaries.
    fn move_character(&mut self, backward: bool) -> bool;

    /// Delete one character, joining paragraphs at a boundary.
    fn delete_character(&mut self, backward: bool) -> bool;

    /// Delete to the next (or previous) word boundary.
    fn delete_word(&mut self, backward: bool) -> bool;

    /// Delete the visual line holding the caret.
    fn delete_line(&mut self) -> bool;

    fn insert_text(&mut self, text: &str) -> bool;

    /// Split the current paragraph at the caret.
    fn split_paragraph(&mut self) -> bool;

    fn undo(&mut self) -> bool;

    fn redo(&mut self) -> bool;

    /// Plain text, paragraphs separated by newlines.
    fn text_content(&self) -> String;
}
