use std::path::PathBuf;

use clap::Parser;
use minisql::{MemoryCatalog, Outcome, ResultSet, Session, SessionOptions};
use tracing_subscriber::{EnvFilter, fmt};

/// Runs a SQL script against a fresh in-memory catalog
#[derive(Debug, Parser)]
#[command(name = "minisql", version)]
struct Args {
    /// Script of semicolon-terminated statements
    script: PathBuf,
    /// Undo every change from the script if any statement fails
    #[arg(long)]
    atomic: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> minisql::Result<()> {
    let script = minisql::load_script(&args.script)?;
    let mut session = Session::with_options(
        MemoryCatalog::new(),
        SessionOptions {
            atomic: args.atomic,
        },
    );
    let output = session.run_script(&script)?;

    // Lexical notices are already reported through the log
    for outcome in &output.outcomes {
        println!("{}", outcome);
        if let Outcome::Query(result) = outcome {
            print_result(result);
        }
    }
    Ok(())
}

fn print_result(result: &ResultSet) {
    println!("Columns: {}", result.columns.join(" | "));
    for row in &result.rows {
        let cells = row.iter().map(ToString::to_string).collect::<Vec<_>>();
        println!("{}", cells.join(" | "));
    }
}
