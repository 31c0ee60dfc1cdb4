use env_logger;
use log;
use rand::Rng;

use tape_sort::{MemoryTape, TapeSorter, TapeSorterBuilder};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    let mut rng = rand::thread_rng();
    let mut input = MemoryTape::from(Vec::from_iter((0..1000).map(|_| rng.gen_range(-10000..=10000))));
    let mut output = MemoryTape::new();

    let sorter: TapeSorter = TapeSorterBuilder::new().with_memory_limit(400).build().unwrap();

    sorter.sort(&mut input, &mut output).unwrap();

    println!("{:?}", &output.as_slice()[..10]);
}
