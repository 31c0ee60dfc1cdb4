//! Tape sorter.

use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::buffer::RunBuffer;
use crate::config::{ConfigError, SortConfig};
use crate::merger::PairwiseMerger;
use crate::run::Run;
use crate::tape::{Tape, TapeError};

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Invalid sorter configuration.
    Config(ConfigError),
    /// Temporary directory creation or removal error.
    Workspace(io::Error),
    /// Input splitting error.
    Split(TapeError),
    /// Runs merging error.
    Merge(TapeError),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            SortError::Config(err) => err,
            SortError::Workspace(err) => err,
            SortError::Split(err) => err,
            SortError::Merge(err) => err,
        })
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::Config(err) => write!(f, "sorter configuration error: {}", err),
            SortError::Workspace(err) => write!(f, "sort failed: temporary directory error: {}", err),
            SortError::Split(err) => write!(f, "sort failed: input splitting error: {}", err),
            SortError::Merge(err) => write!(f, "sort failed: runs merging error: {}", err),
        }
    }
}

impl From<ConfigError> for SortError {
    fn from(err: ConfigError) -> Self {
        SortError::Config(err)
    }
}

/// Tape sorter builder. Provides methods for [`TapeSorter`] initialization.
#[derive(Clone, Default)]
pub struct TapeSorterBuilder {
    /// Sorting configuration.
    config: Option<SortConfig>,
    /// Memory limit overriding the configured one.
    memory_limit: Option<u64>,
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
}

impl TapeSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        TapeSorterBuilder::default()
    }

    /// Builds a [`TapeSorter`] instance using provided configuration.
    pub fn build(self) -> Result<TapeSorter, SortError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(memory_limit) = self.memory_limit {
            config = SortConfig::new(memory_limit, config.delays())?;
        }

        return Ok(TapeSorter::new(config, self.tmp_dir.as_deref()));
    }

    /// Sets sorting configuration.
    pub fn with_config(mut self, config: SortConfig) -> TapeSorterBuilder {
        self.config = Some(config);
        return self;
    }

    /// Sets memory limit in bytes, overriding the one of the configuration.
    pub fn with_memory_limit(mut self, memory_limit: u64) -> TapeSorterBuilder {
        self.memory_limit = Some(memory_limit);
        return self;
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> TapeSorterBuilder {
        self.tmp_dir = Some(path.into());
        return self;
    }
}

/// External tape sorter.
///
/// Sorts the input tape in two phases: the input is split into runs fitting the memory limit, each sorted in
/// memory and saved to a temporary tape, then the runs are merged pairwise until a single one remains, which
/// is copied to the output tape. Temporary tapes are kept in a directory that exists only during a `sort` call.
pub struct TapeSorter {
    /// Sorting configuration.
    config: SortConfig,
    /// Directory to create temporary directories in.
    tmp_dir: Option<Box<Path>>,
}

impl TapeSorter {
    /// Creates a new tape sorter instance.
    ///
    /// # Arguments
    /// * `config` - Sorting configuration
    /// * `tmp_path` - Directory to be used to store temporary data. If the parameter is [`None`] default OS
    ///   temporary directory will be used.
    pub fn new(config: SortConfig, tmp_path: Option<&Path>) -> Self {
        TapeSorter {
            config,
            tmp_dir: tmp_path.map(Into::into),
        }
    }

    /// Returns sorting configuration.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    fn init_tmp_directory(&self) -> Result<tempfile::TempDir, SortError> {
        let tmp_dir = if let Some(tmp_path) = &self.tmp_dir {
            tempfile::Builder::new().prefix("tape-sort").tempdir_in(tmp_path)
        } else {
            tempfile::Builder::new().prefix("tape-sort").tempdir()
        }
        .map_err(SortError::Workspace)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        return Ok(tmp_dir);
    }

    /// Sorts data from the input tape in ascending order and writes it to the output tape starting from
    /// its beginning. Output cells past the sorted data are left untouched.
    /// Temporary data is removed before the function returns, whether sorting succeeded or not.
    /// The output content is undefined if sorting failed.
    ///
    /// # Arguments
    /// * `input` - Tape to read data from
    /// * `output` - Tape to write sorted data to
    pub fn sort<I, O>(&self, input: &mut I, output: &mut O) -> Result<(), SortError>
    where
        I: Tape + ?Sized,
        O: Tape + ?Sized,
    {
        let tmp_dir = self.init_tmp_directory()?;

        let result = self.sort_in(tmp_dir.path(), input, output);
        let tmp_path = tmp_dir.path().to_path_buf();

        match (result, tmp_dir.close()) {
            (Ok(()), Ok(())) => {
                log::info!("sorting done");
                Ok(())
            }
            (Ok(()), Err(err)) => Err(SortError::Workspace(err)),
            (Err(err), close_result) => {
                if let Err(close_err) = close_result {
                    log::warn!("temporary directory {} not removed: {}", tmp_path.display(), close_err);
                }
                Err(err)
            }
        }
    }

    fn sort_in<I, O>(&self, tmp_dir: &Path, input: &mut I, output: &mut O) -> Result<(), SortError>
    where
        I: Tape + ?Sized,
        O: Tape + ?Sized,
    {
        let runs = self.split(tmp_dir, input).map_err(SortError::Split)?;
        log::info!("input split into {} runs", runs.len());

        PairwiseMerger::new(tmp_dir, self.config.delays())
            .merge(runs, output)
            .map_err(SortError::Merge)?;

        return Ok(());
    }

    fn split<I>(&self, tmp_dir: &Path, input: &mut I) -> Result<Vec<Run>, TapeError>
    where
        I: Tape + ?Sized,
    {
        let mut buffer = RunBuffer::with_capacity(self.config.max_elements_per_run(), input.size());
        let mut runs = Vec::new();

        input.rewind()?;
        while !input.is_at_end() {
            buffer.clear();
            while !buffer.is_full() && !input.is_at_end() {
                buffer.push(input.read()?);
                input.move_right()?;
            }

            runs.push(self.create_run(tmp_dir, runs.len(), &mut buffer)?);
        }

        return Ok(runs);
    }

    fn create_run(&self, tmp_dir: &Path, idx: usize, buffer: &mut RunBuffer) -> Result<Run, TapeError> {
        log::debug!("sorting run {} ({} elements) ...", idx, buffer.len());
        buffer.sort();

        log::debug!("saving run {}", idx);
        let name = format!("split_{}.bin", idx);

        Run::build(tmp_dir, &name, buffer.as_slice().iter(), self.config.delays())
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, Instant};

    use rand::Rng;
    use rstest::*;

    use super::{SortError, TapeSorter, TapeSorterBuilder};
    use crate::config::{ConfigError, SortConfig, SortConfigBuilder, ELEMENT_SIZE};
    use crate::tape::{BinaryFileTape, MemoryTape, Tape, TapeDelays, TapeError, TextFileTape};

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir_in("./").unwrap()
    }

    fn sorter(tmp_dir: &Path, elements_per_run: u64) -> TapeSorter {
        TapeSorterBuilder::new()
            .with_memory_limit(elements_per_run * ELEMENT_SIZE)
            .with_tmp_dir(tmp_dir)
            .build()
            .unwrap()
    }

    fn random_input(len: usize) -> Vec<i32> {
        let mut rng = rand::thread_rng();
        Vec::from_iter((0..len).map(|_| rng.gen_range(-10000..=10000)))
    }

    fn assert_workspace_removed(tmp_dir: &tempfile::TempDir) {
        assert_eq!(fs::read_dir(tmp_dir.path()).unwrap().count(), 0);
    }

    #[rstest]
    #[case(vec![], 3, vec![])]
    #[case(vec![42], 3, vec![42])]
    #[case(vec![5, 1, 3, 8, -2, 0, 5], 3, vec![-2, 0, 1, 3, 5, 5, 8])]
    #[case(vec![5, 1, 3, 8, -2, 0, 5], 1, vec![-2, 0, 1, 3, 5, 5, 8])]
    #[case(vec![5, 1, 3, 8, -2, 0, 5], 100, vec![-2, 0, 1, 3, 5, 5, 8])]
    #[case(vec![3, 3, 3, 3], 2, vec![3, 3, 3, 3])]
    #[case(vec![i32::MAX, i32::MIN, 0], 1, vec![i32::MIN, 0, i32::MAX])]
    fn test_tape_sorter(
        tmp_dir: tempfile::TempDir,
        #[case] input: Vec<i32>,
        #[case] elements_per_run: u64,
        #[case] expected: Vec<i32>,
    ) {
        let mut input = MemoryTape::from(input);
        let mut output = MemoryTape::new();

        sorter(tmp_dir.path(), elements_per_run)
            .sort(&mut input, &mut output)
            .unwrap();

        assert_eq!(output.as_slice(), expected.as_slice());
        assert_workspace_removed(&tmp_dir);
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[case(37)]
    #[case(500)]
    fn test_random_input(tmp_dir: tempfile::TempDir, #[case] elements_per_run: u64) {
        let data = random_input(500);
        let mut expected = data.clone();
        expected.sort();

        let mut input = MemoryTape::from(data.clone());
        let mut output = MemoryTape::with_capacity(data.len());
        sorter(tmp_dir.path(), elements_per_run)
            .sort(&mut input, &mut output)
            .unwrap();

        assert_eq!(output.as_slice(), expected.as_slice());
        assert_eq!(input.as_slice(), data.as_slice());
        assert_workspace_removed(&tmp_dir);
    }

    #[rstest]
    fn test_memory_limit_in_bytes(tmp_dir: tempfile::TempDir) {
        let data = random_input(500);
        let config = SortConfigBuilder::new()
            .with_memory_limit((500 * 4) / 10)
            .build()
            .unwrap();
        assert_eq!(config.max_elements_per_run(), 50);

        let sorter = TapeSorterBuilder::new()
            .with_config(config)
            .with_tmp_dir(tmp_dir.path())
            .build()
            .unwrap();

        let mut input = MemoryTape::from(data.clone());
        let mut output = MemoryTape::new();
        sorter.sort(&mut input, &mut output).unwrap();

        let mut expected = data;
        expected.sort();
        assert_eq!(output.into_vec(), expected);
    }

    #[rstest]
    fn test_unlimited_memory(tmp_dir: tempfile::TempDir) {
        let config = SortConfig::parse("memory_limit = 18446744073709551615".as_bytes()).unwrap();
        let sorter = TapeSorterBuilder::new()
            .with_config(config)
            .with_tmp_dir(tmp_dir.path())
            .build()
            .unwrap();

        let mut input = MemoryTape::from(vec![3, 1, 2]);
        let mut output = MemoryTape::new();
        sorter.sort(&mut input, &mut output).unwrap();

        assert_eq!(output.as_slice(), &[1, 2, 3]);
        assert_workspace_removed(&tmp_dir);
    }

    #[rstest]
    fn test_run_delays(tmp_dir: tempfile::TempDir) {
        let config = SortConfigBuilder::new()
            .with_memory_limit(2 * ELEMENT_SIZE)
            .with_write_delay(Duration::from_millis(1))
            .with_shift_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let sorter = TapeSorterBuilder::new()
            .with_config(config)
            .with_tmp_dir(tmp_dir.path())
            .build()
            .unwrap();

        let mut input = MemoryTape::from(vec![8, 7, 6, 5, 4, 3, 2, 1]);
        let mut output = MemoryTape::new();

        let started = Instant::now();
        sorter.sort(&mut input, &mut output).unwrap();

        // split: 8 writes + 8 shifts; two merge levels: 8 writes + 16 shifts each; final copy: 8 shifts
        assert!(started.elapsed() >= Duration::from_millis(72));
        assert_eq!(output.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[rstest]
    fn test_idempotence(tmp_dir: tempfile::TempDir) {
        let sorter = sorter(tmp_dir.path(), 7);

        let mut input = MemoryTape::from(random_input(100));
        let mut once = MemoryTape::new();
        sorter.sort(&mut input, &mut once).unwrap();

        let mut twice = MemoryTape::new();
        sorter.sort(&mut once, &mut twice).unwrap();

        assert_eq!(once.as_slice(), twice.as_slice());
    }

    #[rstest]
    #[case(0)]
    #[case(ELEMENT_SIZE - 1)]
    fn test_memory_limit_too_small(tmp_dir: tempfile::TempDir, #[case] memory_limit: u64) {
        let result = TapeSorterBuilder::new()
            .with_memory_limit(memory_limit)
            .with_tmp_dir(tmp_dir.path())
            .build();

        assert!(matches!(result, Err(SortError::Config(ConfigError::MemoryLimitTooSmall(_)))));
    }

    #[rstest]
    fn test_output_too_small(tmp_dir: tempfile::TempDir) {
        let mut input = MemoryTape::from(vec![4, 3, 2, 1]);
        let mut output = MemoryTape::with_capacity(2);

        let result = sorter(tmp_dir.path(), 2).sort(&mut input, &mut output);

        assert!(matches!(result, Err(SortError::Merge(TapeError::CapacityExceeded { .. }))));
        assert_workspace_removed(&tmp_dir);
    }

    #[rstest]
    fn test_missing_tmp_dir(tmp_dir: tempfile::TempDir) {
        let sorter = sorter(&tmp_dir.path().join("missing"), 2);

        let mut input = MemoryTape::from(vec![2, 1]);
        let mut output = MemoryTape::new();
        let result = sorter.sort(&mut input, &mut output);

        assert!(matches!(result, Err(SortError::Workspace(_))));
        assert!(output.as_slice().is_empty());
    }

    #[rstest]
    fn test_binary_file_tapes(tmp_dir: tempfile::TempDir) {
        let data = random_input(200);
        let input_path = tmp_dir.path().join("input.bin");
        let output_path = tmp_dir.path().join("output.bin");
        fs::write(&input_path, Vec::from_iter(data.iter().flat_map(|v| v.to_le_bytes()))).unwrap();

        {
            let mut input = BinaryFileTape::open(&input_path, TapeDelays::none()).unwrap();
            let mut output = BinaryFileTape::with_capacity(&output_path, input.size(), TapeDelays::none()).unwrap();
            sorter(tmp_dir.path(), 16).sort(&mut input, &mut output).unwrap();
        }

        let mut expected = data;
        expected.sort();
        let actual = Vec::from_iter(
            fs::read(&output_path)
                .unwrap()
                .chunks_exact(4)
                .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
        );
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn test_text_file_tapes(tmp_dir: tempfile::TempDir) {
        let input_path = tmp_dir.path().join("input.txt");
        let output_path = tmp_dir.path().join("output.txt");
        fs::write(&input_path, "5 1 3\n8 -2\n0 5\n").unwrap();

        {
            let mut input = TextFileTape::open(&input_path, TapeDelays::none()).unwrap();
            let mut output = TextFileTape::open(&output_path, TapeDelays::none()).unwrap();
            sorter(tmp_dir.path(), 3).sort(&mut input, &mut output).unwrap();
        }

        assert_eq!(fs::read_to_string(&output_path).unwrap(), "-2 0 1 3 5 5 8");
    }

    #[rstest]
    fn test_dyn_tapes(tmp_dir: tempfile::TempDir) {
        let mut input: Box<dyn Tape> = Box::new(MemoryTape::from(vec![2, 3, 1]));
        let mut output: Box<dyn Tape> = Box::new(MemoryTape::new());

        sorter(tmp_dir.path(), 1).sort(&mut *input, &mut *output).unwrap();

        output.rewind().unwrap();
        let mut actual = Vec::new();
        while !output.is_at_end() {
            actual.push(output.read().unwrap());
            output.move_right().unwrap();
        }
        assert_eq!(actual, vec![1, 2, 3]);
    }
}
