use clap::Parser;
use env_logger::Env;
use log::info;
use snafu::ErrorCompat;
use std::path::Path;

mod args;
mod merge;

fn main() {
    let args = args::Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let input = args.input.unwrap_or_else(|| ".".to_string());
    let out = args.out.unwrap_or_else(|| "surveys.csv".to_string());
    info!("merging survey exports under {:?} into {:?}", input, out);

    if let Err(e) = merge::run_merge(Path::new(&input), Path::new(&out)) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
