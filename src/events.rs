//! Selection event channel shared by the context chart and the focus charts.

use crate::data::{ProcessorError, TimeRange};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Emitted by the context chart whenever the brushed range changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    Changed(TimeRange),
    Cleared,
}

impl SelectionEvent {
    /// The selected range, `None` once the brush is cleared.
    pub fn range(&self) -> Option<&TimeRange> {
        match self {
            SelectionEvent::Changed(range) => Some(range),
            SelectionEvent::Cleared => None,
        }
    }
}

/// A view that reacts to brushed selections.
pub trait LinkedView {
    /// Short name used in logs.
    fn view_name(&self) -> &'static str;

    fn on_selection_change(&mut self, selection: Option<&TimeRange>) -> Result<(), ProcessorError>;
}

/// Cloneable emitter handed to whoever owns a brush.
#[derive(Clone)]
pub struct SelectionSender {
    tx: Sender<SelectionEvent>,
}

impl SelectionSender {
    pub fn emit(&self, event: SelectionEvent) {
        if self.tx.send(event).is_err() {
            log::warn!("Selection event dropped, no receiver: {:?}", event);
        }
    }
}

/// Owns the receiving end; the app drains it once per frame.
pub struct EventBus {
    tx: Sender<SelectionEvent>,
    rx: Receiver<SelectionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> SelectionSender {
        SelectionSender {
            tx: self.tx.clone(),
        }
    }

    /// Drain all pending events and keep only the most recent.
    ///
    /// Brush drags emit on every pointer move; earlier events in the same
    /// frame are superseded by the last one.
    pub fn drain_latest(&self) -> Option<SelectionEvent> {
        self.rx.try_iter().last()
    }

    /// Deliver an event to every view in order. Stops at the first failure.
    pub fn dispatch(
        event: &SelectionEvent,
        views: &mut [&mut dyn LinkedView],
    ) -> Result<(), ProcessorError> {
        match event.range() {
            Some(range) => log::debug!(
                "Selection changed: {} to {}",
                range.start_label(),
                range.end_label()
            ),
            None => log::debug!("Selection cleared"),
        }
        for view in views.iter_mut() {
            log::trace!("Delivering selection to {} view", view.view_name());
            view.on_selection_change(event.range())?;
        }
        Ok(())
    }
}
