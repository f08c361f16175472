//! synfrag CLI entry point

mod args;
mod output;

use args::Args;
use clap::error::ErrorKind;
use clap::Parser;
use synfrag_probe::{run_probe, Outcome};
use tracing_subscriber::EnvFilter;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Help is a usage outcome here, not a success: scripts keying on the
    // exit code must never mistake it for a passed test.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return 0;
        }
        Err(e) => {
            let _ = e.print();
            return 2;
        }
    };

    let cfg = args.into_config();
    println!(
        "Starting test \"{}\" on interface \"{}\".\n",
        cfg.test, cfg.interface
    );

    match run_probe(&cfg) {
        Ok(Outcome::Accepted(frame)) => {
            output::print_frame(&frame);
            println!("\nTest was successful.");
            0
        }
        Ok(Outcome::Unexpected(frame)) => {
            output::print_frame(&frame);
            println!("\nReceived a reply but it wasn't what we were hoping for.");
            eprintln!("Test failed.");
            1
        }
        Ok(Outcome::TimedOut) => {
            eprintln!(
                "Test failed, no response before time out ({} seconds).",
                cfg.timeout.as_secs()
            );
            1
        }
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
