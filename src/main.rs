use std::fs;
use std::path;
use std::process;

use bytesize::ByteSize;
use clap::ArgEnum;
use env_logger;
use log;

use tape_sort::{BinaryFileTape, SortConfig, Tape, TapeSorterBuilder, TextFileTape};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let input = path::Path::new(arg_parser.value_of("input").expect("value is required"));
    let output = path::Path::new(arg_parser.value_of("output").expect("value is required"));
    let tmp_dir: Option<&str> = arg_parser.value_of("tmp_dir");

    let format = match TapeFormat::from_paths(input, output) {
        Ok(format) => format,
        Err(err) => {
            log::error!("{}", err);
            process::exit(1);
        }
    };

    let config = match arg_parser.value_of("config") {
        Some(config) => match SortConfig::from_file(path::Path::new(config)) {
            Ok(config) => config,
            Err(err) => {
                log::error!("configuration loading error: {}", err);
                process::exit(1);
            }
        },
        None => SortConfig::default(),
    };

    let mut sorter_builder = TapeSorterBuilder::new().with_config(config);
    if let Some(memory_limit) = arg_parser.value_of("memory_limit") {
        sorter_builder = sorter_builder.with_memory_limit(
            memory_limit.parse::<ByteSize>().expect("value is pre-validated").as_u64(),
        );
    }

    if let Some(tmp_dir) = tmp_dir {
        sorter_builder = sorter_builder.with_tmp_dir(path::Path::new(tmp_dir));
    }

    let sorter = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };
    log::info!(
        "memory limit: {} ({} elements per run)",
        ByteSize(sorter.config().memory_limit()),
        sorter.config().max_elements_per_run()
    );

    if let Err(err) = fs::File::create(output) {
        log::error!("output file clearing error: {}", err);
        process::exit(1);
    }

    let mut input_tape = match format.open(input, None, sorter.config()) {
        Ok(tape) => tape,
        Err(err) => {
            log::error!("input tape opening error: {}", err);
            process::exit(1);
        }
    };

    let mut output_tape = match format.open(output, Some(input_tape.size()), sorter.config()) {
        Ok(tape) => tape,
        Err(err) => {
            log::error!("output tape opening error: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = sorter.sort(&mut *input_tape, &mut *output_tape) {
        log::error!("data sorting error: {}", err);
        process::exit(1);
    }

    log::info!("completed ({} elements sorted)", output_tape.size());
}

/// Tape file encoding selected by file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TapeFormat {
    Text,
    Binary,
}

impl TapeFormat {
    fn from_path(path: &path::Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(TapeFormat::Text),
            "bin" => Ok(TapeFormat::Binary),
            _ => Err(format!(
                "unsupported file format: {} (allowed formats: .txt, .bin)",
                path.display()
            )),
        }
    }

    fn from_paths(input: &path::Path, output: &path::Path) -> Result<Self, String> {
        let input_format = Self::from_path(input)?;
        let output_format = Self::from_path(output)?;

        if input_format != output_format {
            return Err(format!(
                "extension mismatch: input {}, output {}",
                input.display(),
                output.display()
            ));
        }

        return Ok(input_format);
    }

    /// Opens a tape of this format. Only binary tapes honor `capacity`.
    fn open(
        &self,
        path: &path::Path,
        capacity: Option<usize>,
        config: &SortConfig,
    ) -> Result<Box<dyn Tape>, tape_sort::TapeError> {
        let tape: Box<dyn Tape> = match (self, capacity) {
            (TapeFormat::Text, _) => Box::new(TextFileTape::open(path, config.delays())?),
            (TapeFormat::Binary, None) => Box::new(BinaryFileTape::open(path, config.delays())?),
            (TapeFormat::Binary, Some(capacity)) => {
                Box::new(BinaryFileTape::with_capacity(path, capacity, config.delays())?)
            }
        };

        return Ok(tape);
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("tape-sort")
        .about("sorts integers stored on a file tape")
        .arg(
            clap::Arg::new("input")
                .help("tape file to be sorted (.txt or .bin)")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("output")
                .help("result tape file, same format as the input")
                .required(true)
                .index(2),
        )
        .arg(
            clap::Arg::new("config")
                .help("configuration file with tape delays and memory limit")
                .index(3),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store temporary data")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("memory_limit")
                .short('m')
                .long("memory-limit")
                .help("memory limit overriding the configured one")
                .takes_value(true)
                .validator(|v| match v.parse::<ByteSize>() {
                    Ok(_) => Ok(()),
                    Err(err) => Err(format!("Memory limit format incorrect: {}", err)),
                }),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
