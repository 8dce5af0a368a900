// Caret vertical motion: moves the caret to the same column one visual line
// up or down by probing point-to-range resolution, scrolling on misses.

use crate::config::types::MotionConfig;
use crate::geometry::{
    element_from_selection, is_in_viewport, nearest_scrollable_ancestor, range_bounding_box,
    NodeKind, Rect, SelectionPort, SelectionSnapshot, TextRange,
};

/// Direction of a vertical caret move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    /// Toward the previous visual line.
    Up,
    /// Toward the next visual line.
    Down,
}

impl VerticalDirection {
    fn sign(self) -> f64 {
        match self {
            VerticalDirection::Up => -1.0,
            VerticalDirection::Down => 1.0,
        }
    }
}

/// Why a vertical move left the caret where it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    #[error("no active selection")]
    NoSelection,
    #[error("caret range from point is not supported")]
    PointResolutionUnsupported,
    #[error("no element found for the selection")]
    NoElement,
    #[error("bounding client rect not found")]
    GeometryUnavailable,
    #[error("no caret position found after {probes} probes per pass and {retries} scroll retries")]
    Exhausted { probes: usize, retries: usize },
}

/// Move the caret one visual line in `direction`, keeping it at `horizontal`
/// when given, else at the horizontal center of the current caret box.
///
/// Returns the x-coordinate used, to be fed back on the next vertical move.
/// On failure the selection is left untouched.
pub fn move_caret_vertically<P: SelectionPort + ?Sized>(
    port: &mut P,
    direction: VerticalDirection,
    horizontal: Option<f64>,
    config: &MotionConfig,
) -> Result<f64, MotionError> {
    let selection = port.selection().ok_or(MotionError::NoSelection)?;

    if !port.supports_point_resolution() {
        log::error!("Caret range from point not supported");
        return Err(MotionError::PointResolutionUnsupported);
    }

    let Some(element) = element_from_selection(port, &selection) else {
        log::error!("No element found for the selection");
        return Err(MotionError::NoElement);
    };

    // Point lookups are only accurate for on-screen content.
    if !is_in_viewport(port, element) {
        port.scroll_into_view_centered(element);
    }

    let Some(rect) = reference_rect(port, &selection) else {
        log::error!("Bounding client rect not found");
        return Err(MotionError::GeometryUnavailable);
    };

    if let Some(x) = probe_adjacent_line(port, direction, horizontal, config)? {
        return Ok(x);
    }

    let scroller = nearest_scrollable_ancestor(port, element);
    for retry in 1..=config.scroll_retries {
        log::debug!("Retrying vertical motion after scroll ({retry}/{})", config.scroll_retries);
        port.scroll_by(scroller, direction.sign() * rect.height);
        if let Some(x) = probe_adjacent_line(port, direction, horizontal, config)? {
            return Ok(x);
        }
    }

    log::warn!("Vertical motion {direction:?} found no target line");
    Err(MotionError::Exhausted {
        probes: config.search_limit,
        retries: config.scroll_retries,
    })
}

/// Scroll the caret's scroll container just far enough that the caret box
/// is fully visible. Returns whether a scroll happened.
pub fn scroll_selection_into_view<P: SelectionPort + ?Sized>(port: &mut P) -> bool {
    let Some(selection) = port.selection() else {
        return false;
    };
    let Some(element) = element_from_selection(port, &selection) else {
        return false;
    };
    let Some(rect) = reference_rect(port, &selection) else {
        return false;
    };

    let height = port.viewport().height;
    let dy = if rect.top() < 0.0 {
        rect.top()
    } else if rect.bottom() > height {
        rect.bottom() - height
    } else {
        return false;
    };

    let scroller = nearest_scrollable_ancestor(port, element);
    port.scroll_by(scroller, dy);
    true
}

/// Box of the caret itself; for a caret resting on an element (empty line)
/// that is the element's box.
fn reference_rect<P: SelectionPort + ?Sized>(
    port: &P,
    selection: &SelectionSnapshot,
) -> Option<Rect> {
    let anchor = selection.anchor.node;
    if port.node_kind(anchor) == NodeKind::Element {
        Some(port.element_rect(anchor))
    } else {
        range_bounding_box(port, &selection.range())
    }
}

/// One search pass: probe increasing offsets from the live caret and take
/// the first candidate on a different line. `Ok(None)` means nothing fit.
fn probe_adjacent_line<P: SelectionPort + ?Sized>(
    port: &mut P,
    direction: VerticalDirection,
    horizontal: Option<f64>,
    config: &MotionConfig,
) -> Result<Option<f64>, MotionError> {
    // Re-read every pass: a click may have moved the caret between retries.
    let selection = port.selection().ok_or(MotionError::NoSelection)?;
    let Some(rect) = reference_rect(port, &selection) else {
        log::debug!("Caret box unavailable during vertical probe");
        return Ok(None);
    };

    let sign = direction.sign();
    let x = horizontal.unwrap_or_else(|| rect.center_x());
    let y = rect.center_y();

    for i in 1..=config.search_limit {
        let dy = sign * i as f64 * rect.height;
        let Some(goal) = port.caret_range_from_point(x, y + dy) else {
            continue;
        };
        let Some(candidate) = range_bounding_box(port, &goal) else {
            continue;
        };

        let is_new_line = sign * (candidate.y - rect.y) > config.vertical_epsilon;
        if !is_new_line {
            continue;
        }

        if snapped_to_line_start(port, &goal, &candidate, x, config) {
            log::debug!("Skipping line-start snap at probe {i} (x={x}, got {})", candidate.x);
            continue;
        }

        port.set_selection(goal);
        return Ok(Some(x));
    }
    Ok(None)
}

/// Some engines resolve a point between two lines to the start of the next
/// line instead of the requested column.
fn snapped_to_line_start<P: SelectionPort + ?Sized>(
    port: &P,
    goal: &TextRange,
    candidate: &Rect,
    x: f64,
    config: &MotionConfig,
) -> bool {
    let jumped = x - candidate.x > config.horizontal_epsilon;
    let at_start = goal.start.offset == 0;
    let node = goal.start.node;
    let non_empty_text = port.node_kind(node) == NodeKind::Text && port.text_len(node) > 0;
    jumped && at_start && non_empty_text
}
