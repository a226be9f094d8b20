use std::io;
use std::process;

use log::info;
use simple_bank_ledger::run;

fn main() {
    // Initialize logger (respect RUST_LOG env var if set); logs go to stderr
    env_logger::init();

    info!("starting bank ledger console");

    let stdin = io::stdin();
    if let Err(e) = run(stdin.lock(), io::stdout().lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
