// Selection port: the narrow interface between the editing core and whatever
// lays out text (a browser DOM, the headless layout, or a test fake).

use super::{NodeId, NodeKind, OverflowStyle, Rect, SelectionSnapshot, TextRange, Viewport};

/// Read-only layout queries. Every rectangle is viewport-relative.
pub trait LayoutPort {
    /// The outermost scroll container, used as the fallback scroll target.
    fn document_root(&self) -> NodeId;

    fn node_kind(&self, node: NodeId) -> NodeKind;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Length of the node's text content in characters.
    fn text_len(&self, node: NodeId) -> usize;

    /// One rectangle per line box the range touches.
    fn client_rects(&self, range: &TextRange) -> Vec<Rect>;

    /// The host's own bounding box of the range. May be zero-size for a caret
    /// with no text to measure against.
    fn range_rect(&self, range: &TextRange) -> Rect;

    fn element_rect(&self, node: NodeId) -> Rect;

    fn overflow(&self, node: NodeId) -> OverflowStyle;

    fn scroll_height(&self, node: NodeId) -> f64;

    fn client_height(&self, node: NodeId) -> f64;

    fn viewport(&self) -> Viewport;

    /// Computed font size in pixels.
    fn font_size(&self, node: NodeId) -> f64;
}

/// Selection queries and mutations on top of layout.
pub trait SelectionPort: LayoutPort {
    /// The live selection, or `None` when nothing is selected.
    fn selection(&self) -> Option<SelectionSnapshot>;

    /// Whether `caret_range_from_point` is available on this platform.
    fn supports_point_resolution(&self) -> bool {
        true
    }

    /// Collapsed range nearest to a viewport point, if the point hits text.
    fn caret_range_from_point(&self, x: f64, y: f64) -> Option<TextRange>;

    /// Replace the live selection.
    fn set_selection(&mut self, range: TextRange);

    /// Scroll a container by `dy` pixels (positive scrolls content up).
    fn scroll_by(&mut self, container: NodeId, dy: f64);

    /// Scroll so the node is vertically centered in the viewport.
    fn scroll_into_view_centered(&mut self, node: NodeId);
}
