//! Temporary sorted runs.

use std::fs;
use std::path::Path;

use crate::tape::{BinaryFileTape, Tape, TapeDelays, TapeError};

/// Temporary binary tape holding a sorted part of the data. The backing file is removed when the run is dropped.
pub struct Run {
    tape: BinaryFileTape,
}

impl Run {
    /// Creates an empty run in `dir` able to hold `capacity` elements.
    ///
    /// # Arguments
    /// * `dir` - Directory to create the run file in
    /// * `name` - Run file name, unique within the directory
    /// * `capacity` - Number of elements the run will hold
    /// * `delays` - Tape operation delays
    pub fn create(dir: &Path, name: &str, capacity: usize, delays: TapeDelays) -> Result<Self, TapeError> {
        let path = dir.join(name);
        let tape = BinaryFileTape::create_new(&path, capacity, delays)?;
        log::trace!("run {} created (capacity: {})", path.display(), capacity);

        return Ok(Run { tape });
    }

    /// Builds a run from already sorted items. The returned run is rewound.
    pub fn build<'a>(
        dir: &Path,
        name: &str,
        items: impl ExactSizeIterator<Item = &'a i32>,
        delays: TapeDelays,
    ) -> Result<Self, TapeError> {
        let mut run = Self::create(dir, name, items.len(), delays)?;

        for item in items {
            run.write(*item)?;
            run.move_right()?;
        }
        run.rewind()?;

        return Ok(run);
    }

    /// Returns the run file path.
    pub fn path(&self) -> &Path {
        self.tape.path()
    }
}

impl Tape for Run {
    fn read(&mut self) -> Result<i32, TapeError> {
        self.tape.read()
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        self.tape.write(value)
    }

    fn move_left(&mut self) -> Result<(), TapeError> {
        self.tape.move_left()
    }

    fn move_right(&mut self) -> Result<(), TapeError> {
        self.tape.move_right()
    }

    fn rewind(&mut self) -> Result<(), TapeError> {
        self.tape.rewind()
    }

    fn position(&self) -> usize {
        self.tape.position()
    }

    fn size(&self) -> usize {
        self.tape.size()
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(self.tape.path()) {
            log::warn!("run {} not removed: {}", self.tape.path().display(), err);
        }
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use rstest::*;

    use super::Run;
    use crate::tape::{Tape, TapeDelays, TapeError};

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir_in("./").unwrap()
    }

    #[rstest]
    fn test_run(tmp_dir: tempfile::TempDir) {
        let saved = Vec::from_iter(0..100);

        let mut run = Run::build(tmp_dir.path(), "run.bin", saved.iter(), TapeDelays::none()).unwrap();
        assert_eq!(run.position(), 0);
        assert_eq!(run.size(), 100);

        let mut restored = Vec::new();
        while !run.is_at_end() {
            restored.push(run.read().unwrap());
            run.move_right().unwrap();
        }
        assert_eq!(restored, saved);

        assert!(matches!(run.write(100), Err(TapeError::CapacityExceeded { .. })));
    }

    #[rstest]
    fn test_run_removed_on_drop(tmp_dir: tempfile::TempDir) {
        let run = Run::build(tmp_dir.path(), "run.bin", [1, 2].iter(), TapeDelays::none()).unwrap();
        let path = run.path().to_path_buf();
        assert!(path.exists());

        drop(run);
        assert!(!path.exists());
    }

    #[rstest]
    fn test_duplicate_name(tmp_dir: tempfile::TempDir) {
        let _run = Run::create(tmp_dir.path(), "run.bin", 1, TapeDelays::none()).unwrap();

        match Run::create(tmp_dir.path(), "run.bin", 1, TapeDelays::none()) {
            Err(TapeError::IO(err)) => assert_eq!(err.kind(), io::ErrorKind::AlreadyExists),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("run file reused"),
        }
    }
}
