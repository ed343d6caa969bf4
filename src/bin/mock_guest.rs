//! Mock guest console binary for integration testing
//!
//! Stands in for the emulator: reads newline-terminated commands on stdin,
//! echoes them, and emits the canned responses the harness tests look for.
//!
//! Flags:
//!   --never-exit    keep running after EOF/exit (for timeout tests)
//!   --die-after N   exit silently after consuming N lines (for broken-pipe
//!                   tests)

use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

fn main() {
    let mut never_exit = false;
    let mut die_after: Option<usize> = None;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--never-exit" => never_exit = true,
            "--die-after" => {
                i += 1;
                die_after = args.get(i).and_then(|n| n.parse().ok());
            }
            _ => {}
        }
        i += 1;
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();

    writeln!(writer, "mock guest console ready").ok();
    write!(writer, "$ ").ok();
    writer.flush().ok();

    let mut consumed = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break; // EOF
        }

        consumed += 1;
        if let Some(limit) = die_after {
            if consumed >= limit {
                return; // die mid-session without a word
            }
        }

        let command = line.trim_end_matches('\n');
        writeln!(writer, "$ {}", command).ok();

        if command.contains("stop") {
            writeln!(writer, "Stopped.").ok();
        } else if command.contains("start") {
            writeln!(writer, "animation started").ok();
        } else if command.contains("view") {
            writeln!(writer, "entering view mode").ok();
        } else if command == "exit" {
            writeln!(writer, "exiting").ok();
            writer.flush().ok();
            if !never_exit {
                return;
            }
        }
        writer.flush().ok();
    }

    if never_exit {
        // Simulate a guest that never shuts down on its own.
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    }
}
