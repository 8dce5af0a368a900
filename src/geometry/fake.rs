// Scriptable in-memory layout for unit tests: nodes, rectangles and point
// resolution are set up by hand instead of computed.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{
    LayoutPort, NodeId, NodeKind, OverflowStyle, Rect, SelectionPort, SelectionSnapshot,
    TextRange, Viewport,
};

type PointResolver = Box<dyn Fn(f64, f64, f64) -> Option<TextRange>>;

struct FakeNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    rect: Rect,
    text_len: usize,
    overflow: OverflowStyle,
    scroll_height: f64,
    client_height: f64,
    font_size: f64,
}

pub(crate) struct FakeDom {
    nodes: Vec<FakeNode>,
    ranges: HashMap<TextRange, (Vec<Rect>, Rect)>,
    viewport: Viewport,
    pub selection: Option<SelectionSnapshot>,
    pub point_resolution: bool,
    resolver: PointResolver,
    /// Total pixels scrolled so far; passed to the resolver.
    pub scrolled: f64,
    pub scroll_log: Vec<(NodeId, f64)>,
    pub centered: Vec<NodeId>,
    pub probes: RefCell<Vec<(f64, f64)>>,
}

impl FakeDom {
    pub fn new() -> Self {
        let root = FakeNode {
            kind: NodeKind::Element,
            parent: None,
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            text_len: 0,
            overflow: OverflowStyle::default(),
            scroll_height: 600.0,
            client_height: 600.0,
            font_size: 16.0,
        };
        Self {
            nodes: vec![root],
            ranges: HashMap::new(),
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
            },
            selection: None,
            point_resolution: true,
            resolver: Box::new(|_, _, _| None),
            scrolled: 0.0,
            scroll_log: Vec::new(),
            centered: Vec::new(),
            probes: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>, text_len: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FakeNode {
            kind,
            parent,
            rect: Rect::new(0.0, 0.0, 100.0, 20.0),
            text_len,
            overflow: OverflowStyle::default(),
            scroll_height: 0.0,
            client_height: 0.0,
            font_size: 16.0,
        });
        id
    }

    pub fn element(&mut self, parent: NodeId) -> NodeId {
        self.push(NodeKind::Element, Some(parent), 0)
    }

    pub fn text(&mut self, parent: NodeId, len: usize) -> NodeId {
        let id = self.push(NodeKind::Text, Some(parent), len);
        self.nodes[parent.0].text_len += len;
        id
    }

    pub fn detached(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind, None, 0)
    }

    pub fn set_element_rect(&mut self, node: NodeId, rect: Rect) {
        self.nodes[node.0].rect = rect;
    }

    pub fn set_font_size(&mut self, node: NodeId, size: f64) {
        self.nodes[node.0].font_size = size;
    }

    pub fn set_overflow(
        &mut self,
        node: NodeId,
        style: OverflowStyle,
        scroll_height: f64,
        client_height: f64,
    ) {
        let n = &mut self.nodes[node.0];
        n.overflow = style;
        n.scroll_height = scroll_height;
        n.client_height = client_height;
    }

    pub fn set_range(&mut self, range: TextRange, rects: Vec<Rect>, bounding: Rect) {
        self.ranges.insert(range, (rects, bounding));
    }

    /// Register a range whose single client rect is also its bounding box.
    pub fn set_range_box(&mut self, range: TextRange, rect: Rect) {
        self.set_range(range, vec![rect], rect);
    }

    pub fn on_point<F>(&mut self, resolver: F)
    where
        F: Fn(f64, f64, f64) -> Option<TextRange> + 'static,
    {
        self.resolver = Box::new(resolver);
    }
}

impl LayoutPort for FakeDom {
    fn document_root(&self) -> NodeId {
        self.root()
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0].kind
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn text_len(&self, node: NodeId) -> usize {
        self.nodes[node.0].text_len
    }

    fn client_rects(&self, range: &TextRange) -> Vec<Rect> {
        self.ranges
            .get(range)
            .map(|(rects, _)| rects.clone())
            .unwrap_or_default()
    }

    fn range_rect(&self, range: &TextRange) -> Rect {
        self.ranges
            .get(range)
            .map(|(_, bounding)| *bounding)
            .unwrap_or_default()
    }

    fn element_rect(&self, node: NodeId) -> Rect {
        self.nodes[node.0].rect
    }

    fn overflow(&self, node: NodeId) -> OverflowStyle {
        self.nodes[node.0].overflow
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0].scroll_height
    }

    fn client_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0].client_height
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn font_size(&self, node: NodeId) -> f64 {
        self.nodes[node.0].font_size
    }
}

impl SelectionPort for FakeDom {
    fn selection(&self) -> Option<SelectionSnapshot> {
        self.selection
    }

    fn supports_point_resolution(&self) -> bool {
        self.point_resolution
    }

    fn caret_range_from_point(&self, x: f64, y: f64) -> Option<TextRange> {
        self.probes.borrow_mut().push((x, y));
        (self.resolver)(x, y, self.scrolled)
    }

    fn set_selection(&mut self, range: TextRange) {
        self.selection = Some(SelectionSnapshot::new(range.start, range.end));
    }

    fn scroll_by(&mut self, container: NodeId, dy: f64) {
        self.scrolled += dy;
        self.scroll_log.push((container, dy));
    }

    fn scroll_into_view_centered(&mut self, node: NodeId) {
        self.centered.push(node);
    }
}
