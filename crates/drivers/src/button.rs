//! Debounced push button on a GPIO input.
//!
//! Debounce is a deadline check per poll rather than a blocking wait: an edge
//! away from the stable level arms a deadline, a poll at or after the
//! deadline that still sees the new level commits it, and a bounce back to
//! the stable level before then cancels the deadline.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

use crate::config::DEFAULT_BUTTON_DEBOUNCE_MS;
use crate::error::Error;
use crate::input::{EventQueue, InputDevice, InputEvent, KeyCode};

/// Electrical level that means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Pressed pulls the line high (pull-down wiring).
    High,
    /// Pressed pulls the line low (pull-up wiring).
    #[default]
    Low,
}

/// A single debounced button.
pub struct Button<P> {
    pin: P,
    key: KeyCode,
    active: ActiveLevel,
    debounce: Duration,
    pressed: bool,
    deadline: Option<Instant>,
    events: EventQueue,
}

impl<P: InputPin> Button<P> {
    /// Button reporting `key`, released at start, with the default 50 ms
    /// debounce.
    pub fn new(pin: P, key: KeyCode, active: ActiveLevel) -> Self {
        Self {
            pin,
            key,
            active,
            debounce: Duration::from_millis(DEFAULT_BUTTON_DEBOUNCE_MS),
            pressed: false,
            deadline: None,
            events: EventQueue::new(),
        }
    }

    /// Replace the debounce interval. Zero reports on the first poll that
    /// sees an edge.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Debounce interval.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn sample(&mut self) -> Result<bool, Error<P::Error>> {
        let high = self.pin.is_high().map_err(Error::Bus)?;
        Ok(match self.active {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        })
    }

    /// Sample the pin at time `now`.
    ///
    /// Returns `true` when the debounced state changed; the matching
    /// `KeyPress` / `KeyRelease` is queued for [`InputDevice::poll_event`].
    pub fn poll_at(&mut self, now: Instant) -> Result<bool, Error<P::Error>> {
        let level = self.sample()?;
        if level == self.pressed {
            self.deadline = None;
            return Ok(false);
        }

        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => {
                let deadline = now.checked_add(self.debounce).unwrap_or(Instant::MAX);
                self.deadline = Some(deadline);
                deadline
            }
        };
        if now < deadline {
            return Ok(false);
        }

        self.pressed = level;
        self.deadline = None;
        let event = if level {
            InputEvent::KeyPress(self.key)
        } else {
            InputEvent::KeyRelease(self.key)
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("button: {}", event);
        self.events.push(event);
        Ok(true)
    }

    /// Sample the pin now.
    pub fn poll(&mut self) -> Result<bool, Error<P::Error>> {
        self.poll_at(Instant::now())
    }
}

impl<P: InputPin> InputDevice for Button<P> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop()
    }
}
