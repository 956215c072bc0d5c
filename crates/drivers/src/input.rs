//! Input device abstraction

use heapless::Deque;

use crate::config::INPUT_QUEUE_DEPTH;

/// Input device trait for buttons, keypads and touch controllers.
///
/// Drivers fill an internal queue when they sample their hardware
/// (`poll`/`scan`); this drains it.
pub trait InputDevice {
    /// Pop the oldest pending event (non-blocking).
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Input events from buttons, keypads and touch pads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Key pressed
    KeyPress(KeyCode),
    /// Key released
    KeyRelease(KeyCode),
}

impl InputEvent {
    /// Key the event refers to.
    pub fn key(self) -> KeyCode {
        match self {
            Self::KeyPress(key) | Self::KeyRelease(key) => key,
        }
    }
}

/// Caller-assigned key identifier.
///
/// The drivers never interpret it: a keypad reports the code from its key
/// map, a touch controller the channel number, a button whatever it was
/// built with.
pub type KeyCode = u16;

/// Bounded FIFO shared by the input drivers.
///
/// Events arriving while the queue is full are dropped and counted.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Deque<InputEvent, INPUT_QUEUE_DEPTH>,
    dropped: u32,
}

impl EventQueue {
    /// Empty queue.
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Append `event`, dropping it if the queue is full.
    ///
    /// Returns `false` when the event was dropped.
    pub fn push(&mut self, event: InputEvent) -> bool {
        match self.events.push_back(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                #[cfg(feature = "defmt")]
                defmt::warn!("input queue full, dropped {}", event);
                false
            }
        }
    }

    /// Oldest event, if any.
    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    /// Events waiting.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events lost to overflow since creation.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
