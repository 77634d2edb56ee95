//! Draw history: the current round's canvas as a replayable event log.

use scribble_protocol::DrawEvent;

/// Ordered draw and fill events since the canvas was last cleared.
#[derive(Debug, Default, Clone)]
pub struct DrawHistory {
    events: Vec<DrawEvent>,
}

impl DrawHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. A `Clear` event wipes the log instead.
    pub fn record(&mut self, event: DrawEvent) {
        match event {
            DrawEvent::Clear => self.clear(),
            event => self.events.push(event),
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Reverts the most recent gesture.
    ///
    /// If the last event has a stroke id, every event with that id is
    /// removed; otherwise only the last event is. Returns `false` if the
    /// log was already empty.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.events.last() else {
            return false;
        };
        match last.stroke_id().map(str::to_owned) {
            Some(stroke) => self
                .events
                .retain(|event| event.stroke_id() != Some(stroke.as_str())),
            None => {
                self.events.pop();
            }
        }
        true
    }

    pub fn events(&self) -> &[DrawEvent] {
        &self.events
    }

    /// Owned copy for a `redraw` message.
    pub fn to_vec(&self) -> Vec<DrawEvent> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
