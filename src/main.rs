//! Main entry point for the `sizetree` CLI application.
//!
//! `sizetree` lists what takes up space in a folder: files with their size
//! and subfolders with their recursive totals. Subfolders can then be opened
//! one level at a time; each is scanned once and cached.
//!
//! # Responsibilities
//! - Parses CLI arguments via [`clap`] using the [`Args`] struct
//! - Runs the root scan in the background behind a status spinner
//! - Prints the root listing, then follows `--drill` or enters the
//!   interactive navigator
//! - Exports the root listing with `--output <file.csv>`
//!
//! # Flags of Interest
//! - `--min-size SIZE`: Hide smaller files (`--subfolders false` keeps
//!   folder totals unfiltered)
//! - `--exclude PATTERN`: Skip matching paths
//! - `--timeout SECS`: Cancel the root scan and show what was gathered
//! - `--interactive`: Navigate with `cd`, `up`, `ls`

use anyhow::{Context, Result, bail};
use clap::Parser;
use sizetree::Args;
use sizetree::explorer::{Explorer, ScanObserver};
use sizetree::output::status::StatusLine;
use sizetree::output::terminal::{ViewOptions, write_view};
use sizetree::output::export_csv;
use sizetree::repl;
use std::io::{self, IsTerminal, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Longest a single foreground wait may block.
const FOREVER: Duration = Duration::from_secs(24 * 60 * 60);

fn init_logging() {
    let filter = EnvFilter::try_from_env("SIZETREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Waits for the root scan, cancelling it once `timeout` has passed.
fn wait_for_root(
    explorer: &mut Explorer,
    observer: &mut dyn ScanObserver,
    timeout: Option<Duration>,
) {
    let Some(timeout) = timeout else {
        explorer.run_until_idle(observer, FOREVER);
        return;
    };

    let deadline = Instant::now() + timeout;
    let mut cancelled = false;
    while explorer.is_busy() {
        explorer.pump(observer);
        if !cancelled && Instant::now() >= deadline {
            tracing::warn!("timeout of {:?} reached, cancelling scan", timeout);
            explorer.cancel_root();
            cancelled = true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    explorer.pump(observer);
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    // Print banner
    println!(
        r#"
------------------------------------------------------------------
        sizetree - see where the space went, one folder at a time
------------------------------------------------------------------
"#
    );

    let filter = args.filter_options()?;
    let config = args.scan_config()?;
    println!("Using {} worker thread(s)", config.workers);

    let mut explorer = Explorer::with_config(config);
    explorer
        .scan_root(&args.path, filter)
        .with_context(|| format!("Failed to start scan of {}", args.path.display()))?;

    let mut status = if io::stdout().is_terminal() {
        StatusLine::new()?
    } else {
        StatusLine::hidden()
    };
    wait_for_root(&mut explorer, &mut status, args.timeout());
    status.finish();

    let options = ViewOptions {
        sort: args.sort,
        top: args.top,
    };
    let mut stdout = io::stdout().lock();

    let Some(root_view) = explorer.active_view() else {
        bail!("Scan of {} produced no results", args.path.display());
    };
    write_view(&mut stdout, root_view, &options)?;

    if let Some(csv_path) = &args.output {
        let root_items = &explorer
            .stack()
            .context("Root listing is missing")?
            .root()
            .items;
        export_csv(root_items, csv_path)?;
        println!("Output saved to: {}", csv_path.display());
    }

    if let Some(drill) = &args.drill {
        repl::open_relative(&mut explorer, &mut status, drill)?;
        if let Some(view) = explorer.active_view() {
            writeln!(stdout)?;
            write_view(&mut stdout, view, &options)?;
        }
    }

    if args.interactive {
        let stdin = io::stdin().lock();
        repl::run(&mut explorer, &mut status, stdin, &mut stdout, &options)?;
    }

    explorer.cancel_all();
    Ok(())
}
