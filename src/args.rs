use clap::Parser;

/// Merges heterogeneous survey export files into one unified dataset.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory path, default '.') The root directory holding the survey exports. Files directly
    /// inside it and in its immediate subdirectories are considered; deeper nesting is not traversed.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, default 'surveys.csv') Where the unified CSV dataset is written. A file with this
    /// name is never picked up as an input, even when it lives under the input directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
