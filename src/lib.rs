pub mod bus;
pub mod caret;
pub mod config;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod vim;
