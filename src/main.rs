//! # disk-search CLI
//!
//! ## Usage
//! ```bash
//! disk-search report ~/Documents ~/found 4 2
//! disk-search '\.log$' /var/log /tmp/logs 2 2 --on-collision skip --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", console::style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
