// CLI binary entry point for oxidemux
//
// This is the main entry point for the oxidemux command-line tool.

mod cli;

use std::process;

use clap::Parser;

use crate::cli::Config;

fn main() {
    let config = Config::parse();
    cli::init_logging(&config);

    if let Err(e) = cli::run(&config) {
        eprintln!("✗ {:#}", e);
        process::exit(1);
    }
}
