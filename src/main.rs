//! Command line entry point for the probe.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use h1probe::cases::Category;
use h1probe::runner::{RunOptions, Runner};
use h1probe::{report, suites, Verdict};

#[derive(Parser, Debug)]
#[command(name = "h1probe", version, about = "HTTP/1.1 server behavior probe")]
struct Args {
    /// Target host name or address
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Target TCP port
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Only run cases in this category
    #[arg(long)]
    category: Option<Category>,

    /// Only run the named case (repeatable)
    #[arg(long = "test")]
    tests: Vec<String>,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Write a JSON report to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print raw responses under each result
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let verbose = args.verbose;
    let options = RunOptions {
        host: args.host,
        port: args.port,
        connect_timeout: Duration::from_secs(args.timeout),
        read_timeout: Duration::from_secs(args.timeout),
        category: args.category,
        ids: args.tests,
    };

    println!(
        "Probing {host}:{port}",
        host = options.host,
        port = options.port
    );
    println!();
    report::print_header();

    let runner = Runner::new(options);
    let report = runner
        .run(suites::all(), |result| {
            if result.verdict != Verdict::Skip {
                report::print_result(result, verbose);
            }
        })
        .await;

    report::print_summary(&report);

    if let Some(path) = args.output {
        fs::write(&path, report::render_json(&report)?)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}
