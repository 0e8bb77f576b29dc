use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use waitup::duration::{format_duration, parse_duration};
use waitup::{ProbeEvent, Status, wait_all};

/// Wait until TCP server(s) are ready to accept connections
#[derive(Debug, Parser)]
#[command(name = "waitup", version, about)]
struct Cli {
    /// Set wait timeout
    #[arg(short = 't', long, default_value = "5s", value_parser = parse_duration)]
    timeout: Duration,

    /// Set connection poll frequency
    #[arg(short = 'f', long = "poll-freq", default_value = "500ms", value_parser = parse_duration)]
    poll_freq: Duration,

    /// Suppress waiting messages
    #[arg(short, long)]
    quiet: bool,

    /// Addresses to wait on, e.g. `localhost:5432`, `https://example.com`
    /// or `mysql://db.internal#3s`
    #[arg(value_name = "ADDRESS", required = true)]
    addrs: Vec<String>,
}

fn show(event: &ProbeEvent, timeout: Duration) {
    let line = match event.status() {
        Status::Start => format!(
            "{:>7}: {} for {}",
            event.status(),
            event.target(),
            format_duration(timeout),
        ),
        Status::Ready => format!(
            "{:>7}: {} in {}",
            event.status(),
            event.target(),
            format_duration(event.elapsed()),
        ),
        Status::Failed => match event.error() {
            Some(err) => format!("{:>7}: {}", event.status(), err),
            None => format!("{:>7}: {}", event.status(), event.target()),
        },
    };
    println!("{line}");
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut events = match wait_all(&cli.addrs, cli.poll_freq, cli.timeout) {
        Ok(events) => events,
        Err(err) => {
            println!("{:>7}: {}", "ERROR", err);
            return ExitCode::FAILURE;
        }
    };

    let mut last_elapsed = Duration::ZERO;
    while let Some(event) = events.recv().await {
        if !cli.quiet {
            show(&event, cli.timeout);
        }
        // Abort on the first failure; dropping the stream cancels the
        // remaining probes.
        if event.status() == Status::Failed {
            return ExitCode::FAILURE;
        }
        last_elapsed = event.elapsed();
    }

    if !cli.quiet {
        println!("{:>7}: all ready in {}", "OK", format_duration(last_elapsed));
    }
    ExitCode::SUCCESS
}
