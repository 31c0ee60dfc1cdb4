use std::collections::VecDeque;

use env_logger;
use log;

use tape_sort::{Tape, TapeError, TapeSorterBuilder};

/// Tape counting head shifts.
struct CountingTape {
    cells: VecDeque<i32>,
    head: usize,
    shifts: usize,
}

impl CountingTape {
    fn new(cells: impl IntoIterator<Item = i32>) -> Self {
        CountingTape {
            cells: VecDeque::from_iter(cells),
            head: 0,
            shifts: 0,
        }
    }
}

impl Tape for CountingTape {
    fn read(&mut self) -> Result<i32, TapeError> {
        self.cells.get(self.head).copied().ok_or(TapeError::OutOfRange {
            position: self.head,
            size: self.cells.len(),
        })
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        if self.head < self.cells.len() {
            self.cells[self.head] = value;
        } else if self.head == self.cells.len() {
            self.cells.push_back(value);
        } else {
            return Err(TapeError::OutOfRange {
                position: self.head,
                size: self.cells.len(),
            });
        }

        return Ok(());
    }

    fn move_left(&mut self) -> Result<(), TapeError> {
        self.shifts += 1;
        self.head = self.head.saturating_sub(1);
        return Ok(());
    }

    fn move_right(&mut self) -> Result<(), TapeError> {
        self.shifts += 1;
        self.head = (self.head + 1).min(self.cells.len());
        return Ok(());
    }

    fn rewind(&mut self) -> Result<(), TapeError> {
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

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Info).init();

    let mut input = CountingTape::new((0..100).rev());
    let mut output = CountingTape::new([]);

    let sorter = TapeSorterBuilder::new().with_memory_limit(64).build().unwrap();
    sorter.sort(&mut input, &mut output).unwrap();

    println!("input shifts: {}, output shifts: {}", input.shifts, output.shifts);
    println!("{:?}", Vec::from_iter(output.cells));
}
