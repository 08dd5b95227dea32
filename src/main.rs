// retroshow-upload binary: logging, flag parsing and the exit code.
// A run either finishes the upload (exit 0) or stops at the first failure (exit 1).

use clap::Parser;
use retroshow_upload::{api, cli::Args, ui};
use std::process;

fn main() {
    // RUST_LOG=debug shows request URLs and statuses.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match ui::run(args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            api::report(&err);
            process::exit(1);
        }
    }
}
