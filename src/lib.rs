//! `tape-sort` is a rust implementation of external sorting of integers stored on sequential-access tapes.
//!
//! A tape only allows access to the cell under its head: the head can read or write a single value and move one
//! cell to the left or to the right, or rewind to the beginning. Data stored on a tape may not fit into the
//! memory, so the sorter works in two phases. During the first phase the input is split into runs that fit the
//! memory limit, each run is sorted in memory and saved to a temporary tape. During the second phase the runs
//! are merged pairwise, level by level, until a single sorted run remains which is copied to the output tape.
//! For more information see [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! `tape-sort` supports the following features:
//!
//! * **Tape agnostic:**
//!   the sorter works with any type implementing the [`Tape`] interface. In-memory, fixed-width binary file
//!   and whitespace-delimited text file tapes are provided.
//! * **Memory limit support:**
//!   the number of values held in memory at once never exceeds the configured memory limit.
//! * **Tape latency simulation:**
//!   read, write, rewind and shift operations can be slowed down by configurable delays.
//! * **Guaranteed cleanup:**
//!   temporary tapes are removed once merged and the temporary directory is removed when sorting is done,
//!   whether it succeeded or not.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use env_logger;
//! use log;
//!
//! use tape_sort::{SortConfig, TapeDelays, TapeSorterBuilder, TextFileTape};
//!
//! fn main() {
//!     env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
//!
//!     let config = SortConfig::from_file(Path::new("tape.cfg")).unwrap();
//!
//!     let mut input = TextFileTape::open(Path::new("input.txt"), config.delays()).unwrap();
//!     let mut output = TextFileTape::open(Path::new("output.txt"), TapeDelays::none()).unwrap();
//!
//!     let sorter = TapeSorterBuilder::new()
//!         .with_config(config)
//!         .with_tmp_dir(Path::new("./"))
//!         .build()
//!         .unwrap();
//!
//!     sorter.sort(&mut input, &mut output).unwrap();
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod merger;
pub mod run;
pub mod sort;
pub mod tape;

pub use buffer::RunBuffer;
pub use config::{ConfigError, SortConfig, SortConfigBuilder};
pub use merger::PairwiseMerger;
pub use run::Run;
pub use sort::{SortError, TapeSorter, TapeSorterBuilder};
pub use tape::{BinaryFileTape, MemoryTape, Tape, TapeDelays, TapeError, TextFileTape};
