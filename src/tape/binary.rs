//! Fixed-width binary file tape.

use std::fs;
use std::io::{self, prelude::*, SeekFrom};
use std::path::{Path, PathBuf};

use super::{check_write, pause, Tape, TapeDelays, TapeError};

/// Size of an encoded cell in bytes.
pub const CELL_SIZE: usize = std::mem::size_of::<i32>();

/// Tape stored in a file as a sequence of 4-byte little-endian integers.
pub struct BinaryFileTape {
    file: fs::File,
    path: PathBuf,
    head: usize,
    size: usize,
    capacity: Option<usize>,
    delays: TapeDelays,
}

impl BinaryFileTape {
    /// Opens an unbounded tape, creating the file if it does not exist.
    ///
    /// # Arguments
    /// * `path` - Tape file path
    /// * `delays` - Tape operation delays
    pub fn open(path: &Path, delays: TapeDelays) -> Result<Self, TapeError> {
        Self::open_bounded(path, None, delays)
    }

    /// Opens a tape holding at most `capacity` cells, creating the file if it does not exist.
    /// Fails if the existing file already holds more than `capacity` cells.
    pub fn with_capacity(path: &Path, capacity: usize, delays: TapeDelays) -> Result<Self, TapeError> {
        Self::open_bounded(path, Some(capacity), delays)
    }

    /// Creates a new empty tape holding at most `capacity` cells.
    /// Fails with [`io::ErrorKind::AlreadyExists`] if the file exists.
    pub fn create_new(path: &Path, capacity: usize, delays: TapeDelays) -> Result<Self, TapeError> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Self::from_file(file, path, Some(capacity), delays)
    }

    fn open_bounded(path: &Path, capacity: Option<usize>, delays: TapeDelays) -> Result<Self, TapeError> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        Self::from_file(file, path, capacity, delays)
    }

    fn from_file(file: fs::File, path: &Path, capacity: Option<usize>, delays: TapeDelays) -> Result<Self, TapeError> {
        let file_len = file.metadata()?.len() as usize;
        if file_len % CELL_SIZE != 0 {
            return Err(TapeError::Corrupted(format!(
                "{}: file length {} is not a multiple of {}",
                path.display(),
                file_len,
                CELL_SIZE
            )));
        }

        let size = file_len / CELL_SIZE;
        if let Some(capacity) = capacity {
            if size > capacity {
                return Err(TapeError::CapacityExceeded {
                    position: size,
                    capacity,
                });
            }
        }

        return Ok(BinaryFileTape {
            file,
            path: path.into(),
            head: 0,
            size,
            capacity,
            delays,
        });
    }

    /// Returns the tape file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the tape capacity, if the tape is bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn seek_head(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start((self.head * CELL_SIZE) as u64))?;
        return Ok(());
    }
}

impl Tape for BinaryFileTape {
    fn read(&mut self) -> Result<i32, TapeError> {
        pause(self.delays.read);

        if self.head >= self.size {
            return Err(TapeError::OutOfRange {
                position: self.head,
                size: self.size,
            });
        }

        let mut buf = [0u8; CELL_SIZE];
        self.seek_head()?;
        self.file.read_exact(&mut buf)?;

        return Ok(i32::from_le_bytes(buf));
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        pause(self.delays.write);
        check_write(self.head, self.size, self.capacity)?;

        self.seek_head()?;
        self.file.write_all(&value.to_le_bytes())?;

        if self.head == self.size {
            self.size += 1;
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
        if self.head < self.size {
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
        self.size
    }
}
