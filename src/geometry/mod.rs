// Geometry utilities: bounding boxes for text ranges, line-wrap detection,
// viewport visibility and scroll-container lookup over a layout port.

pub mod port;

#[cfg(test)]
pub(crate) mod fake;

pub use port::{LayoutPort, SelectionPort};

/// An axis-aligned box in viewport-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels (0 for a collapsed caret).
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal midpoint.
    pub fn center_x(&self) -> f64 {
        (self.left() + self.right()) / 2.0
    }

    /// Vertical midpoint.
    pub fn center_y(&self) -> f64 {
        (self.top() + self.bottom()) / 2.0
    }

    /// True when the box has neither width nor height (a degenerate caret box).
    pub fn is_zero_size(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Opaque handle to a node in the host's layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Kind of a layout node. `Other` carries the host's raw node type for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A box-generating element such as a paragraph.
    Element,
    /// A run of text inside an element.
    Text,
    /// Anything else (comments, fragments).
    Other(u16),
}

/// A point in the document: a node plus an offset inside it.
///
/// For text nodes the offset counts characters; for element nodes it counts
/// child positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Containing node.
    pub node: NodeId,
    /// Character or child offset inside `node`.
    pub offset: usize,
}

impl Position {
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A range between two positions. Collapsed when both ends coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// Where the range begins.
    pub start: Position,
    /// Where the range ends.
    pub end: Position,
}

impl TextRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A caret: a range with no extent.
    pub const fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Read-only view of the host's live selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Where the selection started.
    pub anchor: Position,
    /// Where the selection currently extends to.
    pub focus: Position,
}

impl SelectionSnapshot {
    pub const fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub const fn caret(at: Position) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The selected range, anchor to focus.
    pub fn range(&self) -> TextRange {
        TextRange::new(self.anchor, self.focus)
    }
}

/// Computed CSS-like overflow value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    fn allows_scrolling(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

/// The `overflow` / `overflow-y` pair of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowStyle {
    pub overflow: Overflow,
    pub overflow_y: Overflow,
}

impl OverflowStyle {
    pub const fn both(value: Overflow) -> Self {
        Self {
            overflow: value,
            overflow_y: value,
        }
    }
}

/// Size of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Whether a set of client rectangles is the soft-wrap artifact: one box at
/// the end of the previous visual line and one at the start of the next.
fn is_line_wrap_artifact(rects: &[Rect]) -> bool {
    let [first, second] = rects else {
        return false;
    };
    first.x > second.x && first.y < second.y && first.height == second.height
}

/// Tight bounding box of a range.
///
/// A range straddling a soft line wrap yields the box at the start of the new
/// visual line. A zero-size range falls back to the box of the nearest element
/// at or above its start container. Returns `None` when no geometry is
/// available.
pub fn range_bounding_box<P: LayoutPort + ?Sized>(port: &P, range: &TextRange) -> Option<Rect> {
    let rects = port.client_rects(range);
    if is_line_wrap_artifact(&rects) {
        // The caret at a wrapped line end is also drawn at the start of the
        // next line; a virtual cursor cannot tell the two apart.
        return Some(rects[1]);
    }

    let rect = port.range_rect(range);
    if !rect.is_zero_size() {
        return Some(rect);
    }

    let mut node = Some(range.start.node);
    while let Some(current) = node {
        if port.node_kind(current) == NodeKind::Element {
            return Some(port.element_rect(current));
        }
        node = port.parent(current);
    }
    None
}

/// True iff every edge of the node's box lies inside the viewport.
pub fn is_in_viewport<P: LayoutPort + ?Sized>(port: &P, node: NodeId) -> bool {
    let rect = port.element_rect(node);
    let viewport = port.viewport();
    rect.top() >= 0.0
        && rect.left() >= 0.0
        && rect.bottom() <= viewport.height
        && rect.right() <= viewport.width
}

/// First ancestor that scrolls vertically and actually overflows; the
/// document root when there is none.
pub fn nearest_scrollable_ancestor<P: LayoutPort + ?Sized>(port: &P, node: NodeId) -> NodeId {
    let mut parent = port.parent(node);
    while let Some(candidate) = parent {
        let style = port.overflow(candidate);
        let scrollable = style.overflow.allows_scrolling() || style.overflow_y.allows_scrolling();
        if scrollable && port.scroll_height(candidate) > port.client_height(candidate) {
            return candidate;
        }
        parent = port.parent(candidate);
    }
    port.document_root()
}

/// Element owning the selection's anchor: the parent of a text node, or the
/// anchor itself when it is already an element.
pub fn element_from_selection<P: LayoutPort + ?Sized>(
    port: &P,
    selection: &SelectionSnapshot,
) -> Option<NodeId> {
    let anchor = selection.anchor.node;
    match port.node_kind(anchor) {
        NodeKind::Text => port.parent(anchor),
        NodeKind::Element => Some(anchor),
        NodeKind::Other(kind) => {
            log::error!("Unexpected node type {kind} at selection anchor");
            None
        }
    }
}
