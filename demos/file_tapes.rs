use std::fs;
use std::path;
use std::time::Duration;

use env_logger;
use log;

use tape_sort::{SortConfigBuilder, TapeSorterBuilder, TextFileTape};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    fs::write("input.txt", "5 1 3 8 -2 0 5\n").unwrap();
    fs::File::create("output.txt").unwrap();

    let config = SortConfigBuilder::new()
        .with_memory_limit(12)
        .with_read_delay(Duration::from_millis(1))
        .with_write_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    let mut input = TextFileTape::open(path::Path::new("input.txt"), config.delays()).unwrap();
    let mut output = TextFileTape::open(path::Path::new("output.txt"), config.delays()).unwrap();

    let sorter = TapeSorterBuilder::new()
        .with_config(config)
        .with_tmp_dir(path::Path::new("./"))
        .build()
        .unwrap();

    sorter.sort(&mut input, &mut output).unwrap();

    println!("{}", fs::read_to_string("output.txt").unwrap());
}
