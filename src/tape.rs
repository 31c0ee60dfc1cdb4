//! Sequential-access tape interface and implementations.
//!
//! A tape can only be accessed at its head: the value under the head can be read or written and the head
//! can be moved one cell at a time or rewound to the beginning. Every tape obeys the same head policy:
//!
//! * the head never leaves the `[0, size]` range, `size` being the number of written cells,
//!   so the rightmost reachable cell is the append slot right after the last written value;
//! * a write at `head < size` overwrites the cell, a write at `head == size` appends a new cell;
//! * moving left at the beginning or right at the append slot does nothing.

use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::thread;
use std::time::Duration;

pub mod binary;
pub mod text;

pub use binary::BinaryFileTape;
pub use text::TextFileTape;

/// Tape operation error.
#[derive(Debug)]
pub enum TapeError {
    /// Read past the last written cell or write past the append slot.
    OutOfRange { position: usize, size: usize },
    /// Write to a bounded tape at or past its capacity.
    CapacityExceeded { position: usize, capacity: usize },
    /// Backing file contains a token that is not an integer.
    Parse { index: usize, token: String },
    /// Backing file content does not match the tape encoding.
    Corrupted(String),
    /// Common I/O error.
    IO(io::Error),
}

impl Error for TapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            TapeError::IO(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            TapeError::OutOfRange { position, size } => {
                write!(f, "position {} is out of range (tape size: {})", position, size)
            }
            TapeError::CapacityExceeded { position, capacity } => {
                write!(f, "position {} exceeds tape capacity {}", position, capacity)
            }
            TapeError::Parse { index, token } => write!(f, "value #{} is not an integer: {:?}", index, token),
            TapeError::Corrupted(reason) => write!(f, "tape data corrupted: {}", reason),
            TapeError::IO(err) => write!(f, "I/O operation failed: {}", err),
        }
    }
}

impl From<io::Error> for TapeError {
    fn from(err: io::Error) -> Self {
        TapeError::IO(err)
    }
}

/// Sequential-access tape interface.
pub trait Tape {
    /// Reads the value under the head.
    fn read(&mut self) -> Result<i32, TapeError>;

    /// Writes a value under the head, appending a new cell if the head is at the append slot.
    fn write(&mut self, value: i32) -> Result<(), TapeError>;

    /// Moves the head one cell to the left. Does nothing at the beginning of the tape.
    fn move_left(&mut self) -> Result<(), TapeError>;

    /// Moves the head one cell to the right. Does nothing at the append slot.
    fn move_right(&mut self) -> Result<(), TapeError>;

    /// Moves the head to the beginning of the tape.
    fn rewind(&mut self) -> Result<(), TapeError>;

    /// Returns the head position.
    fn position(&self) -> usize;

    /// Returns the number of written cells.
    fn size(&self) -> usize;

    /// Checks if the head is past the last written cell.
    fn is_at_end(&self) -> bool {
        self.position() >= self.size()
    }
}

impl<T: Tape + ?Sized> Tape for Box<T> {
    fn read(&mut self) -> Result<i32, TapeError> {
        (**self).read()
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        (**self).write(value)
    }

    fn move_left(&mut self) -> Result<(), TapeError> {
        (**self).move_left()
    }

    fn move_right(&mut self) -> Result<(), TapeError> {
        (**self).move_right()
    }

    fn rewind(&mut self) -> Result<(), TapeError> {
        (**self).rewind()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn is_at_end(&self) -> bool {
        (**self).is_at_end()
    }
}

/// Artificial tape operation latencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapeDelays {
    /// Pause before every read.
    pub read: Duration,
    /// Pause before every write.
    pub write: Duration,
    /// Pause before every rewind.
    pub rewind: Duration,
    /// Pause before every head shift.
    pub shift: Duration,
}

impl TapeDelays {
    /// Delays of an instant tape.
    pub fn none() -> Self {
        TapeDelays::default()
    }
}

pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Checks a write at `position` against the tape bounds.
pub(crate) fn check_write(position: usize, size: usize, capacity: Option<usize>) -> Result<(), TapeError> {
    if let Some(capacity) = capacity {
        if position >= capacity {
            return Err(TapeError::CapacityExceeded { position, capacity });
        }
    }
    if position > size {
        return Err(TapeError::OutOfRange { position, size });
    }

    return Ok(());
}

/// In-memory tape.
#[derive(Debug, Clone, Default)]
pub struct MemoryTape {
    cells: Vec<i32>,
    head: usize,
    capacity: Option<usize>,
    delays: TapeDelays,
}

impl MemoryTape {
    /// Creates an empty unbounded tape.
    pub fn new() -> Self {
        MemoryTape::default()
    }

    /// Creates an empty tape holding at most `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryTape {
            cells: Vec::with_capacity(capacity),
            capacity: Some(capacity),
            ..MemoryTape::default()
        }
    }

    /// Sets operation delays.
    pub fn with_delays(mut self, delays: TapeDelays) -> Self {
        self.delays = delays;
        return self;
    }

    /// Returns the written cells.
    pub fn as_slice(&self) -> &[i32] {
        &self.cells
    }

    /// Returns the tape capacity, if the tape is bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Consumes the tape returning its cells.
    pub fn into_vec(self) -> Vec<i32> {
        self.cells
    }
}

impl From<Vec<i32>> for MemoryTape {
    fn from(cells: Vec<i32>) -> Self {
        MemoryTape {
            cells,
            ..MemoryTape::default()
        }
    }
}

impl Tape for MemoryTape {
    fn read(&mut self) -> Result<i32, TapeError> {
        pause(self.delays.read);

        match self.cells.get(self.head) {
            Some(value) => Ok(*value),
            None => Err(TapeError::OutOfRange {
                position: self.head,
                size: self.cells.len(),
            }),
        }
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        pause(self.delays.write);
        check_write(self.head, self.cells.len(), self.capacity)?;

        if self.head == self.cells.len() {
            self.cells.push(value);
        } else {
            self.cells[self.head] = value;
        }

        return Ok(());
    }

    fn move_left(&mut self) -> Result<(), TapeError> {
        pause(self.delays.shift);
        self.head = self.head.saturating_sub(1);

        return Ok(());
    }

    fn move_right(&mut self) -> Result<(), TapeError> {
        pause(self.delays.shift);
        if self.head < self.cells.len() {
            self.head += 1;
        }

        return Ok(());
    }

    fn rewind(&mut self) -> Result<(), TapeError> {
        pause(self.delays.rewind);
        self.head = 0;

        return Ok(());
    }

    fn position(&self) -> usize {
        self.head
    }

    fn size(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use rstest::*;

    use super::{MemoryTape, Tape, TapeDelays, TapeError};

    #[test]
    fn test_boundary_scenario() {
        let mut tape = MemoryTape::new();

        tape.write(7).unwrap();
        tape.move_right().unwrap();
        assert_eq!(tape.position(), 1);
        assert!(tape.is_at_end());

        tape.move_right().unwrap();
        assert_eq!(tape.position(), 1);

        tape.rewind().unwrap();
        assert_eq!(tape.read().unwrap(), 7);

        tape.move_left().unwrap();
        assert_eq!(tape.position(), 0);
        assert_eq!(tape.read().unwrap(), 7);
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let mut tape = MemoryTape::from(vec![1, 2, 3]);

        tape.move_right().unwrap();
        tape.write(99).unwrap();

        assert_eq!(tape.size(), 3);
        assert_eq!(tape.as_slice(), &[1, 99, 3]);
    }

    #[test]
    fn test_read_out_of_range() {
        let mut tape = MemoryTape::new();
        tape.write(42).unwrap();
        tape.move_right().unwrap();

        match tape.read() {
            Err(TapeError::OutOfRange { position: 1, size: 1 }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn test_capacity_exceeded(#[case] capacity: usize) {
        let mut tape = MemoryTape::with_capacity(capacity);
        for value in 0..capacity as i32 {
            tape.write(value).unwrap();
            tape.move_right().unwrap();
        }

        match tape.write(-1) {
            Err(TapeError::CapacityExceeded { position, capacity: actual }) => {
                assert_eq!(position, capacity);
                assert_eq!(actual, capacity);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(tape.size(), capacity);
    }

    #[test]
    fn test_delays_applied() {
        let delays = TapeDelays {
            read: Duration::from_millis(5),
            write: Duration::from_millis(5),
            rewind: Duration::from_millis(5),
            shift: Duration::from_millis(5),
        };
        let mut tape = MemoryTape::new().with_delays(delays);

        let started = Instant::now();
        tape.write(1).unwrap();
        tape.move_right().unwrap();
        tape.rewind().unwrap();
        tape.read().unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_boxed_tape() {
        let mut tape: Box<dyn Tape> = Box::new(MemoryTape::new());
        tape.write(5).unwrap();
        tape.rewind().unwrap();

        assert_eq!(tape.read().unwrap(), 5);
        assert_eq!(tape.size(), 1);
        assert!(!tape.is_at_end());
    }
}
