//! flagdeck - Local-first feature flag administration

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = flagdeck::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
