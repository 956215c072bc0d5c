//! Row/column scanned matrix keypad.
//!
//! Rows are outputs idling high; columns are inputs with pull-ups. Driving a
//! single row low makes every closed switch on that row pull its column
//! low. One [`scan`](MatrixKeypad::scan) walks all rows and diffs the result
//! against the previous scan.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::Error;
use crate::input::{EventQueue, InputDevice, InputEvent, KeyCode};

/// `ROWS × COLS` keypad with caller-assigned key codes.
pub struct MatrixKeypad<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    keymap: [[KeyCode; COLS]; ROWS],
    pressed: [[bool; COLS]; ROWS],
    events: EventQueue,
}

impl<R, C, const ROWS: usize, const COLS: usize> MatrixKeypad<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin<Error = R::Error>,
{
    /// Take the pins and drive every row to its idle (high) level.
    ///
    /// `keymap[r][c]` is reported for the switch joining row `r` and
    /// column `c`.
    pub fn new(
        mut rows: [R; ROWS],
        cols: [C; COLS],
        keymap: [[KeyCode; COLS]; ROWS],
    ) -> Result<Self, Error<R::Error>> {
        for row in &mut rows {
            row.set_high().map_err(Error::Bus)?;
        }
        Ok(Self {
            rows,
            cols,
            keymap,
            pressed: [[false; COLS]; ROWS],
            events: EventQueue::new(),
        })
    }

    /// State of the switch at `row`, `col` as of the last scan.
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.pressed
            .get(row)
            .and_then(|cols| cols.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Events dropped because the queue was full.
    pub fn dropped_events(&self) -> u32 {
        self.events.dropped()
    }

    /// Release the pins.
    pub fn release(self) -> ([R; ROWS], [C; COLS]) {
        (self.rows, self.cols)
    }

    /// Sample the whole matrix once and queue an event per changed key.
    ///
    /// The row under test is returned high even when sampling a column
    /// fails.
    pub fn scan(&mut self) -> Result<(), Error<R::Error>> {
        let lines = self
            .rows
            .iter_mut()
            .zip(self.pressed.iter_mut())
            .zip(self.keymap.iter());
        for ((row, previous), codes) in lines {
            row.set_low().map_err(Error::Bus)?;
            let sampled = sample_columns(&mut self.cols);
            row.set_high().map_err(Error::Bus)?;
            let now = sampled.map_err(Error::Bus)?;

            for ((was, is), &code) in previous.iter_mut().zip(now).zip(codes) {
                if *was == is {
                    continue;
                }
                *was = is;
                let event = if is {
                    InputEvent::KeyPress(code)
                } else {
                    InputEvent::KeyRelease(code)
                };
                self.events.push(event);
            }
        }
        Ok(())
    }
}

fn sample_columns<C: InputPin, const COLS: usize>(
    cols: &mut [C; COLS],
) -> Result<[bool; COLS], C::Error> {
    let mut closed = [false; COLS];
    for (col, state) in cols.iter_mut().zip(closed.iter_mut()) {
        *state = col.is_low()?;
    }
    Ok(closed)
}

impl<R, C, const ROWS: usize, const COLS: usize> InputDevice for MatrixKeypad<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin<Error = R::Error>,
{
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop()
    }
}
