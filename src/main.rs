use KiReact::Examples::reaction_examples::reaction_examples;
use KiReact::Utils::logger::init_logger;
use log::LevelFilter;

pub fn main() {
    init_logger(LevelFilter::Info);
    let task: usize = 5;
    if let Err(err) = reaction_examples(task) {
        eprintln!("example {} failed: {}", task, err);
    }
}
