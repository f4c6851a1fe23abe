//! Console progress display
//!
//! Interactive one-line status written with carriage returns, kept
//! separate from the structured log stream so the countdown does not
//! spam the log.

use std::io::{self, Write};

/// Per-file sorting status, overwriting the current console line
pub fn sorting_line(file_name: &str, label: &str, remaining_secs: u64) {
    print!(
        "\rSorting document: {} | Classified as: {} | Remaining time: {}s",
        file_name, label, remaining_secs
    );
    let _ = io::stdout().flush();
}

/// Countdown tick shown between cycles
pub fn countdown_line(remaining_secs: u64) {
    print!("\rNext scan in {}s ", remaining_secs);
    let _ = io::stdout().flush();
}

/// Terminate the overwritten line before normal logging resumes
pub fn end_line() {
    println!();
}
