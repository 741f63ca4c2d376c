//! Rule engine CLI: classifies each URL in a file against a declarative
//! rule set and prints `<original-url> -> <result>` per line.
//!
//! Usage: `rule-engine <rules-file> <urls-file> [--threads N]`

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rule_engine::{classify, load_rules_from_path, RuleEngine};

/// Classify URLs against a declarative, priority-ordered rule set.
#[derive(Parser, Debug)]
#[command(name = "rule-engine")]
#[command(author, version, about = "Classify URLs against an indexed rule set")]
struct Args {
    /// Path to the rule specification file (JSON array of rule objects).
    rules_file: PathBuf,

    /// Path to the URL list, one URL per line.
    urls_file: PathBuf,

    /// Number of worker threads for batch classification. Defaults to the
    /// available parallelism.
    #[arg(long)]
    threads: Option<usize>,

    /// Log level: error, warn, info, debug. Overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    loglevel: String,

    /// Shorthand for --loglevel debug.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { args.loglevel.as_str() };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let rules = load_rules_from_path(&args.rules_file)?;
    let engine = RuleEngine::new(rules);
    tracing::info!(rule_count = engine.rule_count(), rules_file = %args.rules_file.display(), "rules loaded");

    let urls_content = std::fs::read_to_string(&args.urls_file)
        .map_err(|e| anyhow::anyhow!("failed to read url file {}: {e}", args.urls_file.display()))?;

    let threads = args.threads.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)).max(1);

    let lines: Vec<(usize, &str)> = urls_content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();
    let chunk_size = lines.len().div_ceil(threads).max(1);

    let mut outputs: Vec<(usize, &str, String)> = Vec::with_capacity(lines.len());
    std::thread::scope(|scope| {
        let handles: Vec<_> = lines
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(|| {
                    chunk
                        .iter()
                        .map(|&(index, line)| (index, line, classify(&engine, line)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            outputs.extend(handle.join().expect("classification worker thread panicked"));
        }
    });
    outputs.sort_by_key(|(index, _, _)| *index);

    use std::io::Write;
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for (_, original, result) in outputs {
        writeln!(out, "{original} -> {result}")?;
    }

    Ok(())
}
