// Headless text layout: a monospace, soft-wrapping paragraph layout that
// answers the selection port's geometry queries and applies document edits.
//
// Node tree: the root element (the scroll container) is node 0, paragraph
// `i` is element `1 + 2i`, and its text node is `2 + 2i` (absent while the
// paragraph is empty).

use unicode_width::UnicodeWidthChar;

use crate::config::types::LayoutConfig;
use crate::document::TextDocument;
use crate::geometry::{
    LayoutPort, NodeId, NodeKind, Overflow, OverflowStyle, Position, Rect, SelectionPort,
    SelectionSnapshot, TextRange, Viewport,
};

/// A caret location in document terms: paragraph index and character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DocPoint {
    /// Paragraph index.
    pub paragraph: usize,
    /// Character offset inside the paragraph.
    pub offset: usize,
}

impl DocPoint {
    pub const fn new(paragraph: usize, offset: usize) -> Self {
        Self { paragraph, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Root,
    Paragraph(usize),
    Text(usize),
}

/// One visual line of a paragraph, as character offsets `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisualLine {
    start: usize,
    end: usize,
    columns: usize,
}

#[derive(Debug, Clone)]
struct Snapshot {
    paragraphs: Vec<String>,
    anchor: DocPoint,
    focus: DocPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Word,
    Punctuation,
}

fn char_class(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Greedy wrap at `columns` display columns. An empty paragraph is one line.
fn wrap(text: &str, columns: usize) -> Vec<VisualLine> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = 0;
    let mut count = 0;
    for (i, ch) in text.chars().enumerate() {
        let w = char_width(ch);
        if width + w > columns && i > start {
            lines.push(VisualLine {
                start,
                end: i,
                columns: width,
            });
            start = i;
            width = 0;
        }
        width += w;
        count = i + 1;
    }
    lines.push(VisualLine {
        start,
        end: count,
        columns: width,
    });
    lines
}

/// The document plus its layout, selection, scroll position and history.
pub struct TextLayout {
    paragraphs: Vec<String>,
    lines: Vec<Vec<VisualLine>>,
    anchor: DocPoint,
    focus: DocPoint,
    scroll_top: f64,
    config: LayoutConfig,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl TextLayout {
    /// Lay out `text`, one paragraph per line. The caret starts at the
    /// beginning of the document.
    pub fn new(text: &str, config: LayoutConfig) -> Self {
        let mut paragraphs: Vec<String> = text.lines().map(str::to_string).collect();
        if paragraphs.is_empty() {
            paragraphs.push(String::new());
        }
        let mut layout = Self {
            paragraphs,
            lines: Vec::new(),
            anchor: DocPoint::default(),
            focus: DocPoint::default(),
            scroll_top: 0.0,
            config,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        layout.relayout();
        layout
    }

    fn relayout(&mut self) {
        let columns = self.config.wrap_columns;
        self.lines = self.paragraphs.iter().map(|p| wrap(p, columns)).collect();
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Caret (selection focus) location.
    pub fn caret(&self) -> DocPoint {
        self.focus
    }

    /// Collapse the selection at a clamped location.
    pub fn set_caret(&mut self, point: DocPoint) {
        let point = self.clamp_point(point);
        self.anchor = point;
        self.focus = point;
    }

    #[cfg(test)]
    pub fn select(&mut self, anchor: DocPoint, focus: DocPoint) {
        self.anchor = self.clamp_point(anchor);
        self.focus = self.clamp_point(focus);
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn visual_line_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn paragraph_node(index: usize) -> NodeId {
        NodeId(1 + 2 * index)
    }

    pub fn text_node(index: usize) -> NodeId {
        NodeId(2 + 2 * index)
    }

    // ── Node mapping ────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Option<Node> {
        let n = id.0;
        if n == 0 {
            return Some(Node::Root);
        }
        let index = (n - 1) / 2;
        if index >= self.paragraphs.len() {
            return None;
        }
        if n % 2 == 1 {
            Some(Node::Paragraph(index))
        } else if self.char_len(index) > 0 {
            Some(Node::Text(index))
        } else {
            None
        }
    }

    fn char_len(&self, paragraph: usize) -> usize {
        self.paragraphs
            .get(paragraph)
            .map(|p| p.chars().count())
            .unwrap_or(0)
    }

    fn clamp_point(&self, point: DocPoint) -> DocPoint {
        let paragraph = point.paragraph.min(self.paragraphs.len() - 1);
        DocPoint::new(paragraph, point.offset.min(self.char_len(paragraph)))
    }

    fn position_of(&self, point: DocPoint) -> Position {
        if self.char_len(point.paragraph) == 0 {
            Position::new(Self::paragraph_node(point.paragraph), 0)
        } else {
            Position::new(Self::text_node(point.paragraph), point.offset)
        }
    }

    fn point_of(&self, position: Position) -> Option<DocPoint> {
        let point = match self.node(position.node)? {
            Node::Root => {
                let last = self.paragraphs.len() - 1;
                if position.offset > last {
                    DocPoint::new(last, self.char_len(last))
                } else {
                    DocPoint::new(position.offset, 0)
                }
            }
            Node::Paragraph(i) if position.offset == 0 => DocPoint::new(i, 0),
            Node::Paragraph(i) => DocPoint::new(i, self.char_len(i)),
            Node::Text(i) => DocPoint::new(i, position.offset.min(self.char_len(i))),
        };
        Some(point)
    }

    fn ordered(&self) -> (DocPoint, DocPoint) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }

    // ── Geometry ────────────────────────────────────────────────────

    fn first_line(&self, paragraph: usize) -> usize {
        self.lines[..paragraph].iter().map(Vec::len).sum()
    }

    fn content_height(&self) -> f64 {
        2.0 * self.config.padding + self.visual_line_count() as f64 * self.config.line_height
    }

    fn max_scroll(&self) -> f64 {
        (self.content_height() - self.config.viewport_height).max(0.0)
    }

    fn line_top(&self, global_line: usize) -> f64 {
        self.config.padding + global_line as f64 * self.config.line_height - self.scroll_top
    }

    fn x_at(&self, paragraph: usize, line: &VisualLine, offset: usize) -> f64 {
        if offset >= line.end {
            return self.config.padding + line.columns as f64 * self.config.char_width;
        }
        let columns: usize = self.paragraphs[paragraph]
            .chars()
            .skip(line.start)
            .take(offset.saturating_sub(line.start))
            .map(char_width)
            .sum();
        self.config.padding + columns as f64 * self.config.char_width
    }

    /// Local index of the visual line showing a caret. A caret on a wrap
    /// boundary is shown at the start of the following line.
    fn line_index(&self, point: DocPoint) -> usize {
        let lines = &self.lines[point.paragraph];
        lines
            .iter()
            .position(|line| point.offset < line.end)
            .unwrap_or(lines.len() - 1)
    }

    fn displayed_line(&self, point: DocPoint) -> (usize, VisualLine) {
        let local = self.line_index(point);
        (local, self.lines[point.paragraph][local])
    }

    /// Map a global visual line index to (paragraph, local line).
    fn locate_line(&self, mut global: usize) -> Option<(usize, usize)> {
        for (paragraph, lines) in self.lines.iter().enumerate() {
            if global < lines.len() {
                return Some((paragraph, global));
            }
            global -= lines.len();
        }
        None
    }

    fn caret_rects(&self, point: DocPoint) -> Vec<Rect> {
        if self.char_len(point.paragraph) == 0 {
            return Vec::new();
        }
        let lines = &self.lines[point.paragraph];
        let first = self.first_line(point.paragraph);
        let local = self.line_index(point);
        let rect_on = |local: usize| {
            Rect::new(
                self.x_at(point.paragraph, &lines[local], point.offset),
                self.line_top(first + local),
                0.0,
                self.config.line_height,
            )
        };
        if local > 0 && point.offset == lines[local].start {
            vec![rect_on(local - 1), rect_on(local)]
        } else {
            vec![rect_on(local)]
        }
    }

    fn span_rects(&self, start: DocPoint, end: DocPoint) -> Vec<Rect> {
        let mut rects = Vec::new();
        for paragraph in start.paragraph..=end.paragraph {
            let from = if paragraph == start.paragraph { start.offset } else { 0 };
            let to = if paragraph == end.paragraph {
                end.offset
            } else {
                self.char_len(paragraph)
            };
            let first = self.first_line(paragraph);
            for (local, line) in self.lines[paragraph].iter().enumerate() {
                let a = from.max(line.start);
                let b = to.min(line.end);
                if a >= b {
                    continue;
                }
                let left = self.x_at(paragraph, line, a);
                let right = self.x_at(paragraph, line, b);
                rects.push(Rect::new(
                    left,
                    self.line_top(first + local),
                    right - left,
                    self.config.line_height,
                ));
            }
        }
        rects
    }

    fn rects_for(&self, range: &TextRange) -> Vec<Rect> {
        let (Some(start), Some(end)) = (self.point_of(range.start), self.point_of(range.end))
        else {
            return Vec::new();
        };
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        if start == end {
            self.caret_rects(start)
        } else {
            self.span_rects(start, end)
        }
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.scroll_top = value.clamp(0.0, self.max_scroll());
    }

    // ── Editing ─────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            paragraphs: self.paragraphs.clone(),
            anchor: self.anchor,
            focus: self.focus,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.paragraphs = snapshot.paragraphs;
        self.anchor = snapshot.anchor;
        self.focus = snapshot.focus;
        self.relayout();
    }

    /// Record the state before an edit and lay out the result.
    fn commit(&mut self, before: Snapshot) {
        self.undo_stack.push(before);
        while self.undo_stack.len() > self.config.history_limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.relayout();
    }

    fn next_point(&self, point: DocPoint) -> Option<DocPoint> {
        if point.offset < self.char_len(point.paragraph) {
            Some(DocPoint::new(point.paragraph, point.offset + 1))
        } else if point.paragraph + 1 < self.paragraphs.len() {
            Some(DocPoint::new(point.paragraph + 1, 0))
        } else {
            None
        }
    }

    fn prev_point(&self, point: DocPoint) -> Option<DocPoint> {
        if point.offset > 0 {
            Some(DocPoint::new(point.paragraph, point.offset - 1))
        } else if point.paragraph > 0 {
            let paragraph = point.paragraph - 1;
            Some(DocPoint::new(paragraph, self.char_len(paragraph)))
        } else {
            None
        }
    }

    /// Remove the text between two ordered points, joining paragraphs, and
    /// collapse the caret at `start`. Does not record history.
    fn remove_span(&mut self, start: DocPoint, end: DocPoint) {
        let end_text = &self.paragraphs[end.paragraph];
        let tail = end_text[byte_index(end_text, end.offset)..].to_string();
        let head = &mut self.paragraphs[start.paragraph];
        let cut = byte_index(head, start.offset);
        head.truncate(cut);
        head.push_str(&tail);
        self.paragraphs.drain(start.paragraph + 1..=end.paragraph);
        self.anchor = start;
        self.focus = start;
    }

    /// Delete a non-collapsed selection. Returns whether one was deleted.
    fn remove_selection(&mut self) -> bool {
        let (start, end) = self.ordered();
        if start == end {
            return false;
        }
        self.remove_span(start, end);
        true
    }

    fn delete_span(&mut self, start: DocPoint, end: DocPoint) -> bool {
        if start == end {
            return false;
        }
        let before = self.snapshot();
        self.remove_span(start, end);
        self.commit(before);
        true
    }

    fn delete_selection_or<F>(&mut self, span: F) -> bool
    where
        F: FnOnce(&Self, DocPoint) -> Option<(DocPoint, DocPoint)>,
    {
        if self.anchor != self.focus {
            let before = self.snapshot();
            self.remove_selection();
            self.commit(before);
            return true;
        }
        match span(self, self.focus) {
            Some((start, end)) => self.delete_span(start, end),
            None => false,
        }
    }

    fn word_end(&self, point: DocPoint) -> DocPoint {
        let chars: Vec<char> = self.paragraphs[point.paragraph].chars().collect();
        let mut i = point.offset;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i < chars.len() {
            let class = char_class(chars[i]);
            while i < chars.len() && char_class(chars[i]) == class {
                i += 1;
            }
        }
        DocPoint::new(point.paragraph, i)
    }

    fn word_start(&self, point: DocPoint) -> DocPoint {
        let chars: Vec<char> = self.paragraphs[point.paragraph].chars().collect();
        let mut i = point.offset.min(chars.len());
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        if i > 0 {
            let class = char_class(chars[i - 1]);
            while i > 0 && char_class(chars[i - 1]) == class {
                i -= 1;
            }
        }
        DocPoint::new(point.paragraph, i)
    }
}

impl LayoutPort for TextLayout {
    fn document_root(&self) -> NodeId {
        NodeId(0)
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        match self.node(node) {
            Some(Node::Root | Node::Paragraph(_)) => NodeKind::Element,
            Some(Node::Text(_)) => NodeKind::Text,
            None => NodeKind::Other(0),
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        match self.node(node)? {
            Node::Root => None,
            Node::Paragraph(_) => Some(NodeId(0)),
            Node::Text(i) => Some(Self::paragraph_node(i)),
        }
    }

    fn text_len(&self, node: NodeId) -> usize {
        match self.node(node) {
            Some(Node::Root) => (0..self.paragraphs.len()).map(|i| self.char_len(i)).sum(),
            Some(Node::Paragraph(i) | Node::Text(i)) => self.char_len(i),
            None => 0,
        }
    }

    fn client_rects(&self, range: &TextRange) -> Vec<Rect> {
        self.rects_for(range)
    }

    fn range_rect(&self, range: &TextRange) -> Rect {
        let rects = self.rects_for(range);
        let (start, end) = (self.point_of(range.start), self.point_of(range.end));
        if start.is_some() && start == end {
            // A caret reports the box where it ends the previous line.
            return rects.first().copied().unwrap_or_default();
        }
        rects
            .iter()
            .copied()
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default()
    }

    fn element_rect(&self, node: NodeId) -> Rect {
        match self.node(node) {
            Some(Node::Root) => Rect::new(
                0.0,
                0.0,
                self.config.viewport_width,
                self.config.viewport_height,
            ),
            Some(Node::Paragraph(i) | Node::Text(i)) => Rect::new(
                self.config.padding,
                self.line_top(self.first_line(i)),
                self.config.wrap_columns as f64 * self.config.char_width,
                self.lines[i].len() as f64 * self.config.line_height,
            ),
            None => Rect::default(),
        }
    }

    fn overflow(&self, node: NodeId) -> OverflowStyle {
        match self.node(node) {
            Some(Node::Root) => OverflowStyle::both(Overflow::Auto),
            _ => OverflowStyle::default(),
        }
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        match self.node(node) {
            Some(Node::Root) => self.content_height(),
            _ => self.element_rect(node).height,
        }
    }

    fn client_height(&self, node: NodeId) -> f64 {
        match self.node(node) {
            Some(Node::Root) => self.config.viewport_height,
            _ => self.element_rect(node).height,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.config.viewport_width,
            height: self.config.viewport_height,
        }
    }

    fn font_size(&self, _node: NodeId) -> f64 {
        self.config.font_size
    }
}

impl SelectionPort for TextLayout {
    fn selection(&self) -> Option<SelectionSnapshot> {
        Some(SelectionSnapshot::new(
            self.position_of(self.anchor),
            self.position_of(self.focus),
        ))
    }

    fn caret_range_from_point(&self, x: f64, y: f64) -> Option<TextRange> {
        let viewport = self.viewport();
        if x < 0.0 || y < 0.0 || x > viewport.width || y > viewport.height {
            return None;
        }
        let content_y = y + self.scroll_top - self.config.padding;
        let global = (content_y / self.config.line_height).floor().max(0.0) as usize;
        let (paragraph, local) = self.locate_line(global)?;
        let lines = &self.lines[paragraph];
        let line = lines[local];

        let target = ((x - self.config.padding) / self.config.char_width)
            .round()
            .max(0.0) as usize;
        let mut offset = line.start;
        let mut columns = 0;
        for ch in self.paragraphs[paragraph]
            .chars()
            .skip(line.start)
            .take(line.end - line.start)
        {
            if columns >= target {
                break;
            }
            columns += char_width(ch);
            offset += 1;
        }
        // The end of a wrapped line is the start of the next one.
        if local + 1 < lines.len() && offset >= line.end && line.end > line.start {
            offset = line.end - 1;
        }

        Some(TextRange::collapsed(
            self.position_of(DocPoint::new(paragraph, offset)),
        ))
    }

    fn set_selection(&mut self, range: TextRange) {
        match (self.point_of(range.start), self.point_of(range.end)) {
            (Some(anchor), Some(focus)) => {
                self.anchor = anchor;
                self.focus = focus;
            }
            _ => log::warn!("Ignoring selection on a detached node: {range:?}"),
        }
    }

    fn scroll_by(&mut self, container: NodeId, dy: f64) {
        if container != self.document_root() {
            log::debug!("Only the root scrolls; scrolling it for {container:?}");
        }
        self.set_scroll_top(self.scroll_top + dy);
    }

    fn scroll_into_view_centered(&mut self, node: NodeId) {
        let rect = self.element_rect(node);
        let content_center = rect.center_y() + self.scroll_top;
        self.set_scroll_top(content_center - self.config.viewport_height / 2.0);
    }
}

impl TextDocument for TextLayout {
    fn move_character(&mut self, backward: bool) -> bool {
        let target = if backward {
            self.prev_point(self.focus)
        } else {
            self.next_point(self.focus)
        };
        match target {
            Some(point) => {
                self.anchor = point;
                self.focus = point;
                true
            }
            None => false,
        }
    }

    fn delete_character(&mut self, backward: bool) -> bool {
        self.delete_selection_or(|doc, caret| {
            if backward {
                doc.prev_point(caret).map(|p| (p, caret))
            } else {
                doc.next_point(caret).map(|p| (caret, p))
            }
        })
    }

    fn delete_word(&mut self, backward: bool) -> bool {
        self.delete_selection_or(|doc, caret| {
            if backward {
                if caret.offset == 0 {
                    doc.prev_point(caret).map(|p| (p, caret))
                } else {
                    Some((doc.word_start(caret), caret))
                }
            } else if caret.offset >= doc.char_len(caret.paragraph) {
                doc.next_point(caret).map(|p| (caret, p))
            } else {
                Some((caret, doc.word_end(caret)))
            }
        })
    }

    fn delete_line(&mut self) -> bool {
        let caret = self.focus;
        let (_, line) = self.displayed_line(caret);
        let paragraph = caret.paragraph;
        let becomes_empty = line.start == 0 && line.end == self.char_len(paragraph);

        if becomes_empty && self.paragraphs.len() > 1 {
            let before = self.snapshot();
            self.paragraphs.remove(paragraph);
            let next = paragraph.min(self.paragraphs.len() - 1);
            self.anchor = DocPoint::new(next, 0);
            self.focus = self.anchor;
            self.commit(before);
            return true;
        }

        self.delete_span(
            DocPoint::new(paragraph, line.start),
            DocPoint::new(paragraph, line.end),
        )
    }

    fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let before = self.snapshot();
        self.remove_selection();
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                let caret = self.focus;
                let current = &mut self.paragraphs[caret.paragraph];
                let at = byte_index(current, caret.offset);
                let tail = current.split_off(at);
                self.paragraphs.insert(caret.paragraph + 1, tail);
                self.focus = DocPoint::new(caret.paragraph + 1, 0);
            }
            let caret = self.focus;
            let current = &mut self.paragraphs[caret.paragraph];
            let at = byte_index(current, caret.offset);
            current.insert_str(at, segment);
            self.focus = DocPoint::new(caret.paragraph, caret.offset + segment.chars().count());
        }
        self.anchor = self.focus;
        self.commit(before);
        true
    }

    fn split_paragraph(&mut self) -> bool {
        self.insert_text("\n")
    }

    fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(previous);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.snapshot());
        self.restore(next);
        true
    }

    fn text_content(&self) -> String {
        self.paragraphs.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::{move_caret_vertically, VerticalDirection};
    use crate::config::types::MotionConfig;
    use crate::geometry::range_bounding_box;
    use rstest::rstest;

    const LINE: f64 = 20.0;

    /// 10 columns of 10px, 20px lines, no padding, 5 visible lines.
    fn config() -> LayoutConfig {
        LayoutConfig {
            font_size: 16.0,
            line_height: LINE,
            char_width: 10.0,
            wrap_columns: 10,
            padding: 0.0,
            viewport_width: 200.0,
            viewport_height: 100.0,
            history_limit: 50,
        }
    }

    fn layout(text: &str) -> TextLayout {
        TextLayout::new(text, config())
    }

    fn caret_at(layout: &TextLayout, paragraph: usize, offset: usize) -> TextRange {
        TextRange::collapsed(layout.position_of(DocPoint::new(paragraph, offset)))
    }

    // ── Wrapping and node tree ──────────────────────────────────────

    #[test]
    fn long_paragraph_wraps_at_column_limit() {
        let doc = layout("abcdefghijklmnopqrstuvwxy");
        assert_eq!(doc.visual_line_count(), 3);
        assert_eq!(
            doc.element_rect(TextLayout::paragraph_node(0)),
            Rect::new(0.0, 0.0, 100.0, 3.0 * LINE)
        );
    }

    #[test]
    fn wide_characters_count_double() {
        let doc = layout("漢字漢字漢字");
        assert_eq!(doc.visual_line_count(), 2);
    }

    #[test]
    fn empty_document_has_one_empty_paragraph() {
        let doc = layout("");
        assert_eq!(doc.paragraphs(), &[String::new()]);
        assert_eq!(doc.visual_line_count(), 1);
    }

    #[test]
    fn node_tree_shape() {
        let doc = layout("one\n\nthree");
        assert_eq!(doc.node_kind(NodeId(0)), NodeKind::Element);
        assert_eq!(doc.node_kind(TextLayout::paragraph_node(1)), NodeKind::Element);
        assert_eq!(doc.node_kind(TextLayout::text_node(0)), NodeKind::Text);
        // Empty paragraphs have no text node.
        assert_eq!(doc.node_kind(TextLayout::text_node(1)), NodeKind::Other(0));
        assert_eq!(
            doc.parent(TextLayout::text_node(2)),
            Some(TextLayout::paragraph_node(2))
        );
        assert_eq!(doc.parent(TextLayout::paragraph_node(2)), Some(NodeId(0)));
        assert_eq!(doc.parent(NodeId(0)), None);
        assert_eq!(doc.text_len(NodeId(0)), 8);
    }

    #[test]
    fn caret_in_empty_paragraph_sits_on_the_element() {
        let mut doc = layout("one\n\nthree");
        doc.set_caret(DocPoint::new(1, 0));
        let selection = doc.selection().unwrap();
        assert_eq!(selection.anchor, Position::new(TextLayout::paragraph_node(1), 0));
    }

    // ── Geometry ────────────────────────────────────────────────────

    #[test]
    fn caret_box_is_zero_width_line_height() {
        let doc = layout("hello");
        let rect = range_bounding_box(&doc, &caret_at(&doc, 0, 3)).unwrap();
        assert_eq!(rect, Rect::new(30.0, 0.0, 0.0, LINE));
    }

    #[test]
    fn caret_on_wrap_boundary_reports_line_wrap_artifact() {
        let doc = layout("abcdefghijklm");
        let range = caret_at(&doc, 0, 10);
        let rects = doc.client_rects(&range);
        assert_eq!(
            rects,
            vec![
                Rect::new(100.0, 0.0, 0.0, LINE),
                Rect::new(0.0, LINE, 0.0, LINE)
            ]
        );
        assert_eq!(range_bounding_box(&doc, &range), Some(Rect::new(0.0, LINE, 0.0, LINE)));
    }

    #[test]
    fn empty_paragraph_caret_falls_back_to_element_box() {
        let doc = layout("one\n\nthree");
        let range = caret_at(&doc, 1, 0);
        assert!(doc.range_rect(&range).is_zero_size());
        assert_eq!(
            range_bounding_box(&doc, &range),
            Some(Rect::new(0.0, LINE, 100.0, LINE))
        );
    }

    #[test]
    fn single_character_range_has_character_width() {
        let doc = layout("a漢b");
        let range = TextRange::new(
            Position::new(TextLayout::text_node(0), 1),
            Position::new(TextLayout::text_node(0), 2),
        );
        assert_eq!(doc.range_rect(&range), Rect::new(10.0, 0.0, 20.0, LINE));
    }

    #[test]
    fn multi_line_range_has_rect_per_line() {
        let doc = layout("abcdefghijklm\nxyz");
        let range = TextRange::new(
            Position::new(TextLayout::text_node(0), 8),
            Position::new(TextLayout::text_node(1), 2),
        );
        assert_eq!(doc.client_rects(&range).len(), 3);
        assert_eq!(doc.range_rect(&range), Rect::new(0.0, 0.0, 100.0, 3.0 * LINE));
    }

    #[test]
    fn padding_offsets_everything() {
        let doc = TextLayout::new(
            "hello",
            LayoutConfig {
                padding: 16.0,
                ..config()
            },
        );
        let rect = range_bounding_box(&doc, &caret_at(&doc, 0, 2)).unwrap();
        assert_eq!(rect, Rect::new(36.0, 16.0, 0.0, LINE));
    }

    // ── Point resolution ────────────────────────────────────────────

    #[rstest]
    #[case(34.0, 5.0, 0, 3)]
    #[case(36.0, 5.0, 0, 4)]
    #[case(0.0, 25.0, 1, 0)]
    #[case(95.0, 25.0, 1, 5)]
    #[case(190.0, 25.0, 1, 5)]
    fn point_resolves_to_nearest_caret(
        #[case] x: f64,
        #[case] y: f64,
        #[case] paragraph: usize,
        #[case] offset: usize,
    ) {
        let doc = layout("hello\nworld\n");
        assert_eq!(
            doc.caret_range_from_point(x, y),
            Some(caret_at(&doc, paragraph, offset))
        );
    }

    #[test]
    fn point_outside_viewport_resolves_to_nothing() {
        let doc = layout("hello");
        assert_eq!(doc.caret_range_from_point(-1.0, 5.0), None);
        assert_eq!(doc.caret_range_from_point(5.0, 101.0), None);
    }

    #[test]
    fn point_below_content_resolves_to_nothing() {
        let doc = layout("hello");
        assert_eq!(doc.caret_range_from_point(5.0, 50.0), None);
    }

    #[test]
    fn point_past_wrapped_line_end_stays_on_that_line() {
        let doc = layout("abcdefghijklm");
        let range = doc.caret_range_from_point(150.0, 5.0);
        assert_eq!(range, Some(caret_at(&doc, 0, 9)));
    }

    #[test]
    fn point_on_empty_paragraph_resolves_to_element() {
        let doc = layout("one\n\nthree");
        let range = doc.caret_range_from_point(50.0, 30.0);
        assert_eq!(
            range,
            Some(TextRange::collapsed(Position::new(TextLayout::paragraph_node(1), 0)))
        );
    }

    // ── Scrolling ───────────────────────────────────────────────────

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut doc = layout("1\n2\n3\n4\n5\n6\n7\n8");
        doc.scroll_by(NodeId(0), 500.0);
        assert_eq!(doc.scroll_top(), 60.0);
        doc.scroll_by(NodeId(0), -500.0);
        assert_eq!(doc.scroll_top(), 0.0);
    }

    #[test]
    fn scrolling_moves_rects_up() {
        let mut doc = layout("1\n2\n3\n4\n5\n6\n7\n8");
        doc.scroll_by(NodeId(0), LINE);
        assert_eq!(doc.element_rect(TextLayout::paragraph_node(1)).y, 0.0);
        assert_eq!(doc.caret_range_from_point(2.0, 5.0), Some(caret_at(&doc, 1, 0)));
    }

    #[test]
    fn center_scroll_puts_paragraph_mid_viewport() {
        let mut doc = layout("1\n2\n3\n4\n5\n6\n7\n8");
        doc.scroll_into_view_centered(TextLayout::paragraph_node(5));
        // Paragraph 5 spans 100..120; its center (110) lands at 50.
        assert_eq!(doc.scroll_top(), 60.0);
    }

    #[test]
    fn root_is_the_scroll_container_only_when_overflowing() {
        let doc = layout("1\n2");
        assert!(doc.scroll_height(NodeId(0)) <= doc.client_height(NodeId(0)));
        let tall = layout("1\n2\n3\n4\n5\n6");
        assert!(tall.scroll_height(NodeId(0)) > tall.client_height(NodeId(0)));
        assert_eq!(tall.overflow(NodeId(0)), OverflowStyle::both(Overflow::Auto));
    }

    // ── Vertical motion over real layout ────────────────────────────

    #[test]
    fn down_and_up_keep_the_column_across_short_and_empty_lines() {
        let mut doc = layout("abcdefghij\nabc\n\nabcdefgh");
        doc.set_caret(DocPoint::new(0, 6));
        let motion = MotionConfig::default();

        let mut anchor = None;
        let mut visited = Vec::new();
        for _ in 0..3 {
            anchor = Some(
                move_caret_vertically(&mut doc, VerticalDirection::Down, anchor, &motion).unwrap(),
            );
            visited.push(doc.caret());
        }
        assert_eq!(
            visited,
            vec![DocPoint::new(1, 3), DocPoint::new(2, 0), DocPoint::new(3, 6)]
        );
        assert_eq!(anchor, Some(60.0));

        for _ in 0..3 {
            anchor = Some(
                move_caret_vertically(&mut doc, VerticalDirection::Up, anchor, &motion).unwrap(),
            );
        }
        assert_eq!(doc.caret(), DocPoint::new(0, 6));
    }

    #[test]
    fn down_within_a_wrapped_paragraph() {
        let mut doc = layout("abcdefghijklmnopqrst");
        doc.set_caret(DocPoint::new(0, 4));
        move_caret_vertically(&mut doc, VerticalDirection::Down, None, &MotionConfig::default())
            .unwrap();
        assert_eq!(doc.caret(), DocPoint::new(0, 14));
    }

    #[test]
    fn down_past_the_viewport_scrolls_and_retries() {
        let mut doc = layout("l0\nl1\nl2\nl3\nl4\nl5\nl6\nl7");
        doc.set_caret(DocPoint::new(4, 1));

        let x = move_caret_vertically(&mut doc, VerticalDirection::Down, None, &MotionConfig::default());

        assert_eq!(x, Ok(10.0));
        assert_eq!(doc.caret(), DocPoint::new(5, 1));
        assert_eq!(doc.scroll_top(), LINE);
    }

    #[test]
    fn up_from_the_first_line_is_exhausted() {
        let mut doc = layout("l0\nl1");
        doc.set_caret(DocPoint::new(0, 1));
        let result =
            move_caret_vertically(&mut doc, VerticalDirection::Up, None, &MotionConfig::default());
        assert!(result.is_err());
        assert_eq!(doc.caret(), DocPoint::new(0, 1));
    }

    // ── Editing ─────────────────────────────────────────────────────

    #[test]
    fn move_character_crosses_paragraphs() {
        let mut doc = layout("ab\ncd");
        doc.set_caret(DocPoint::new(0, 2));
        assert!(doc.move_character(false));
        assert_eq!(doc.caret(), DocPoint::new(1, 0));
        assert!(doc.move_character(true));
        assert_eq!(doc.caret(), DocPoint::new(0, 2));
        doc.set_caret(DocPoint::new(0, 0));
        assert!(!doc.move_character(true));
    }

    #[test]
    fn delete_character_forward_and_backward() {
        let mut doc = layout("abc");
        doc.set_caret(DocPoint::new(0, 1));
        assert!(doc.delete_character(false));
        assert_eq!(doc.text_content(), "ac");
        assert!(doc.delete_character(true));
        assert_eq!(doc.text_content(), "c");
        assert_eq!(doc.caret(), DocPoint::new(0, 0));
        assert!(!doc.delete_character(true));
    }

    #[test]
    fn delete_character_at_paragraph_end_joins() {
        let mut doc = layout("ab\ncd");
        doc.set_caret(DocPoint::new(0, 2));
        assert!(doc.delete_character(false));
        assert_eq!(doc.paragraphs(), &["abcd".to_string()]);
    }

    #[test]
    fn delete_character_removes_a_selection() {
        let mut doc = layout("hello world");
        doc.select(DocPoint::new(0, 8), DocPoint::new(0, 2));
        assert!(doc.delete_character(false));
        assert_eq!(doc.text_content(), "herld");
        assert_eq!(doc.caret(), DocPoint::new(0, 2));
    }

    #[rstest]
    #[case("hello world", 0, " world")]
    #[case("hello world", 5, "hello")]
    #[case("hello world", 2, "he world")]
    #[case("foo.bar baz", 3, "foobar baz")]
    #[case("a  b", 1, "a")]
    fn delete_word_forward(#[case] text: &str, #[case] offset: usize, #[case] expected: &str) {
        let mut doc = layout(text);
        doc.set_caret(DocPoint::new(0, offset));
        assert!(doc.delete_word(false));
        assert_eq!(doc.text_content(), expected);
    }

    #[test]
    fn delete_word_backward() {
        let mut doc = layout("hello brave world");
        doc.set_caret(DocPoint::new(0, 12));
        assert!(doc.delete_word(true));
        assert_eq!(doc.text_content(), "hello world");
        assert_eq!(doc.caret(), DocPoint::new(0, 6));
    }

    #[test]
    fn delete_word_at_paragraph_end_joins_next() {
        let mut doc = layout("ab\ncd");
        doc.set_caret(DocPoint::new(0, 2));
        assert!(doc.delete_word(false));
        assert_eq!(doc.text_content(), "abcd");
    }

    #[test]
    fn delete_line_removes_the_paragraph() {
        let mut doc = layout("one\ntwo\nthree");
        doc.set_caret(DocPoint::new(1, 1));
        assert!(doc.delete_line());
        assert_eq!(doc.text_content(), "one\nthree");
        assert_eq!(doc.caret(), DocPoint::new(1, 0));
    }

    #[test]
    fn delete_last_line_moves_caret_up() {
        let mut doc = layout("one\ntwo");
        doc.set_caret(DocPoint::new(1, 2));
        assert!(doc.delete_line());
        assert_eq!(doc.text_content(), "one");
        assert_eq!(doc.caret(), DocPoint::new(0, 0));
    }

    #[test]
    fn delete_line_removes_only_the_visual_line() {
        let mut doc = layout("abcdefghijKLM");
        doc.set_caret(DocPoint::new(0, 11));
        assert!(doc.delete_line());
        assert_eq!(doc.text_content(), "abcdefghij");
    }

    #[test]
    fn delete_line_on_sole_paragraph_clears_it() {
        let mut doc = layout("only");
        assert!(doc.delete_line());
        assert_eq!(doc.text_content(), "");
        assert!(!doc.delete_line());
    }

    #[test]
    fn insert_and_split() {
        let mut doc = layout("held");
        doc.set_caret(DocPoint::new(0, 3));
        assert!(doc.insert_text("lo wor"));
        assert_eq!(doc.text_content(), "hello word");
        assert!(doc.split_paragraph());
        assert_eq!(doc.paragraphs(), &["hello wor".to_string(), "d".to_string()]);
        assert_eq!(doc.caret(), DocPoint::new(1, 0));
        assert!(!doc.insert_text(""));
    }

    #[test]
    fn insert_multibyte_text() {
        let mut doc = layout("ac");
        doc.set_caret(DocPoint::new(0, 1));
        doc.insert_text("é漢");
        assert_eq!(doc.text_content(), "aé漢c");
        assert_eq!(doc.caret(), DocPoint::new(0, 3));
    }

    #[test]
    fn undo_and_redo_restore_text_and_caret() {
        let mut doc = layout("hello world");
        doc.set_caret(DocPoint::new(0, 6));
        doc.delete_word(false);
        assert_eq!(doc.text_content(), "hello ");

        assert!(doc.undo());
        assert_eq!(doc.text_content(), "hello world");
        assert_eq!(doc.caret(), DocPoint::new(0, 6));

        assert!(doc.redo());
        assert_eq!(doc.text_content(), "hello ");
        assert!(!doc.redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut doc = layout("abc");
        doc.delete_character(false);
        doc.undo();
        doc.insert_text("x");
        assert!(!doc.redo());
    }

    #[test]
    fn history_is_bounded() {
        let mut doc = TextLayout::new(
            "abcdef",
            LayoutConfig {
                history_limit: 2,
                ..config()
            },
        );
        for _ in 0..4 {
            doc.delete_character(false);
        }
        assert!(doc.undo());
        assert!(doc.undo());
        assert!(!doc.undo());
        assert_eq!(doc.text_content(), "cdef");
    }
}
