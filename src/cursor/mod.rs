// Cursor rendering: recomputes the caret's visual box on every selection
// change and produces the custom cursor box for the current mode.

pub mod offset;

use serde::Serialize;

use crate::config::types::CursorConfig;
use crate::geometry::{
    element_from_selection, range_bounding_box, Position, SelectionPort, TextRange,
};
use crate::vim::EditMode;
use offset::ContainerOffset;

/// Cursor shape styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    /// Filled box over the next character (Command mode).
    Block,
    /// Thin vertical bar (Edit mode).
    Beam,
}

/// Why a selection change left the cursor where it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("no element found for the selection")]
    NoElement,
    #[error("bounding client rect not found")]
    GeometryUnavailable,
}

/// The cursor as drawn, relative to the editor container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorBox {
    /// Top edge, relative to the container.
    pub top: f64,
    /// Left edge, relative to the container.
    pub left: f64,
    /// Font size times the line-height factor.
    pub height: f64,
    /// Next character's width, or the thin width at end of line and in Edit mode.
    pub width: f64,
    /// Shape for the current mode.
    pub style: CursorStyle,
    /// Rounded corners (Edit mode).
    pub rounded: bool,
    /// Fill opacity.
    pub alpha: f32,
}

/// Viewport-relative caret corner.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CaretCorner {
    top: f64,
    left: f64,
}

/// Manages caret geometry and renders the custom cursor.
pub struct CursorRenderer {
    position: Option<CaretCorner>,
    height: f64,
    width: f64,
    offset: Option<ContainerOffset>,
    mode: EditMode,
    focused: bool,
    config: CursorConfig,
}

impl CursorRenderer {
    pub fn new(config: CursorConfig) -> Self {
        Self {
            position: None,
            height: config.initial_height,
            width: config.thin_width,
            offset: None,
            mode: EditMode::default(),
            focused: true,
            config,
        }
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    /// Container offset subtracted at render time; may arrive late.
    pub fn set_offset(&mut self, offset: Option<ContainerOffset>) {
        self.offset = offset;
    }

    /// The editor lost focus.
    pub fn blur(&mut self) {
        self.focused = false;
        self.position = None;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn is_visible(&self) -> bool {
        self.focused && self.position.is_some()
    }

    /// Resync with the live selection. On error the last geometry is kept.
    pub fn on_selection_change<P: SelectionPort + ?Sized>(
        &mut self,
        port: &P,
    ) -> Result<(), CursorError> {
        let Some(selection) = port.selection() else {
            self.position = None;
            return Ok(());
        };
        if !selection.is_collapsed() {
            self.position = None;
            return Ok(());
        }

        let Some(element) = element_from_selection(port, &selection) else {
            log::error!("No element found for the selection");
            return Err(CursorError::NoElement);
        };

        let anchor = selection.anchor;
        let width = if port.text_len(element) == anchor.offset {
            self.config.thin_width
        } else {
            let end = (anchor.offset + 1).min(port.text_len(anchor.node));
            let next_char = TextRange::new(anchor, Position::new(anchor.node, end));
            let Some(rect) = range_bounding_box(port, &next_char) else {
                log::error!("Bounding client rect not found");
                return Err(CursorError::GeometryUnavailable);
            };
            rect.width
        };

        let Some(rect) = range_bounding_box(port, &selection.range()) else {
            log::error!("Bounding client rect not found for the caret");
            return Err(CursorError::GeometryUnavailable);
        };

        let height = port.font_size(element) * self.config.line_height_factor;
        // New or empty lines have a line box taller than the caret.
        let top = if rect.height > height {
            rect.top() + (rect.height - height) / 2.0
        } else {
            rect.top()
        };

        self.position = Some(CaretCorner {
            top,
            left: rect.left(),
        });
        self.height = height;
        self.width = width;
        Ok(())
    }

    /// The cursor to draw, or `None` while hidden.
    pub fn render(&self) -> Option<CursorBox> {
        if !self.focused {
            return None;
        }
        let position = self.position?;
        let offset = self.offset.unwrap_or_default();
        let (width, style, rounded, alpha) = match self.mode {
            EditMode::Edit => (self.config.thin_width, CursorStyle::Beam, true, 0.7),
            EditMode::Command => (self.width, CursorStyle::Block, false, 0.5),
        };
        Some(CursorBox {
            top: position.top - offset.top,
            left: position.left - offset.left,
            height: self.height,
            width,
            style,
            rounded,
            alpha,
        })
    }
}
