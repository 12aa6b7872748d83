//! Brush and zoom state for the time axis.
//!
//! Both work in data units (days), so the brushed dates survive any zoom.

use crate::data::TimeRange;
use crate::events::SelectionEvent;

/// Horizontal zoom over a fixed data extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomState {
    full: (f64, f64),
    visible: (f64, f64),
    k: f64,
    scale_extent: (f64, f64),
}

impl ZoomState {
    pub fn new(full: (f64, f64), scale_extent: (f64, f64)) -> Self {
        let full = if full.0 <= full.1 {
            full
        } else {
            (full.1, full.0)
        };
        let lo = if scale_extent.0.is_finite() && scale_extent.0 > 0.0 {
            scale_extent.0
        } else {
            1.0
        };
        let hi = if scale_extent.1.is_finite() {
            scale_extent.1.max(lo)
        } else {
            lo
        };
        let mut zoom = Self {
            full,
            visible: full,
            k: 1.0,
            scale_extent: (lo, hi),
        };
        zoom.reset();
        zoom
    }

    fn mid(range: (f64, f64)) -> f64 {
        (range.0 + range.1) / 2.0
    }

    pub fn full(&self) -> (f64, f64) {
        self.full
    }

    pub fn visible(&self) -> (f64, f64) {
        self.visible
    }

    pub fn scale(&self) -> f64 {
        self.k
    }

    /// Multiply the scale by `factor`, keeping `anchor` at the same screen
    /// position. Returns `true` if the visible window changed.
    pub fn zoom_at(&mut self, anchor: f64, factor: f64) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        let before = self.visible;
        self.apply_scale(self.k * factor, anchor);
        before != self.visible
    }

    /// Back to the full extent, or as close as the scale extent allows.
    pub fn reset(&mut self) {
        self.k = 1.0;
        self.visible = self.full;
        self.apply_scale(self.scale_extent.0, Self::mid(self.full));
    }

    fn apply_scale(&mut self, k: f64, anchor: f64) {
        let k = k.clamp(self.scale_extent.0, self.scale_extent.1);
        let full_span = self.full.1 - self.full.0;
        let span = self.visible.1 - self.visible.0;
        if full_span <= 0.0 || span <= 0.0 {
            self.k = k;
            return;
        }

        let anchor = anchor.clamp(self.visible.0, self.visible.1);
        let ratio = (anchor - self.visible.0) / span;
        let new_span = full_span / k;

        let mut start = anchor - new_span * ratio;
        // Keep the window inside the data extent
        start = start.clamp(self.full.0, (self.full.1 - new_span).max(self.full.0));

        self.k = k;
        self.visible = (start, (start + new_span).min(self.full.1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    /// Drawing a new range from a fixed edge.
    Sweep { anchor: f64 },
    /// Dragging the whole selection.
    Move { grab: f64, origin: TimeRange },
}

/// One-dimensional brush over the time axis.
#[derive(Debug, Clone, Default)]
pub struct Brush {
    selection: Option<TimeRange>,
    gesture: Option<Gesture>,
}

impl Brush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<TimeRange> {
        self.selection
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Start a gesture at `x`. Pressing near an edge resizes from the other
    /// edge, inside the selection moves it, anywhere else starts a new one.
    pub fn begin(&mut self, x: f64, extent: (f64, f64), edge_tolerance: f64) {
        let x = x.clamp(extent.0, extent.1);
        self.gesture = Some(match self.selection {
            Some(sel) if (x - sel.start).abs() <= edge_tolerance => {
                Gesture::Sweep { anchor: sel.end }
            }
            Some(sel) if (x - sel.end).abs() <= edge_tolerance => {
                Gesture::Sweep { anchor: sel.start }
            }
            Some(sel) if x > sel.start && x < sel.end => Gesture::Move {
                grab: x,
                origin: sel,
            },
            _ => Gesture::Sweep { anchor: x },
        });
    }

    /// Continue the gesture with the pointer at `x`.
    pub fn update(&mut self, x: f64, extent: (f64, f64)) -> Option<SelectionEvent> {
        let x = x.clamp(extent.0, extent.1);
        let range = match self.gesture? {
            Gesture::Sweep { anchor } => TimeRange::new(anchor.clamp(extent.0, extent.1), x),
            Gesture::Move { grab, origin } => {
                let width = origin.width();
                let max_start = (extent.1 - width).max(extent.0);
                let start = (origin.start + (x - grab)).clamp(extent.0, max_start);
                TimeRange::new(start, start + width)
            }
        };
        self.selection = Some(range);
        Some(SelectionEvent::Changed(range))
    }

    /// Finish the gesture. An empty selection is cleared.
    pub fn end(&mut self) -> Option<SelectionEvent> {
        self.gesture.take()?;
        match self.selection {
            Some(sel) if sel.width() <= 0.0 => self.clear(),
            _ => None,
        }
    }

    /// Remove the selection. Emits `Cleared` only if there was one.
    pub fn clear(&mut self) -> Option<SelectionEvent> {
        self.gesture = None;
        self.selection.take().map(|_| SelectionEvent::Cleared)
    }
}
