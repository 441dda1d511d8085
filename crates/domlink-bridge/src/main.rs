//! domlink conformance harness entry point.
//!
//! This binary drives a [`DomHandler`] the way a control page's test buttons
//! would: it feeds channel updates to the handler, lets it mutate an in-memory
//! render surface, and prints what happened.  No transport is involved; the
//! harness calls the handler directly.
//!
//! # Usage
//!
//! ```text
//! domlink-bridge [OPTIONS]
//!
//! Options:
//!   --debug                     Log per-update diagnostics
//!   --routes <FILE>             TOML route file [default: stock routes]
//!   --update <CHANNEL=VALUE>    Apply one update (repeatable); stdin when absent
//!   --queue-capacity <N>        Observer queue capacity [default: 64]
//!   --omit-element <ID>         Leave an element out of the surface (repeatable)
//!   --echo <CHANNEL>            Echo a channel's last value after the updates
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Default | Description                 |
//! |--------------------------|---------|-----------------------------|
//! | `DOMLINK_DEBUG`          | `false` | Per-update diagnostics      |
//! | `DOMLINK_ROUTES`         | none    | Route file path             |
//! | `DOMLINK_QUEUE_CAPACITY` | `64`    | Observer queue capacity     |
//!
//! # Output
//!
//! stdout carries JSON lines only, so the harness can be scripted:
//!
//! ```text
//! {"direction":"rx","channel":"lights.info","value":"50%"}
//! {"direction":"tx","channel":"lights.info","value":"50%"}
//! {"surface":{"computer":{"text":"","hidden":false,...},...},"dropped":0}
//! ```
//!
//! Logs go to stderr.
//!
//! # Example
//!
//! ```text
//! printf 'hdmi.disable=1\nlights.info=100%%\n' | domlink-bridge --debug
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use domlink_bridge::application::{DomHandler, QueueObserver, RenderSurface, UpdateObserver};
use domlink_bridge::domain::{BridgeConfig, ObservedUpdate};
use domlink_bridge::infrastructure::{load_route_file, ElementState, MemorySurface};
use domlink_core::{parse_update_line, RouteTable};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// domlink conformance harness.
///
/// Applies channel updates to an in-memory render surface and prints the
/// observed rx/tx traffic and the final surface state as JSON lines.
#[derive(Debug, Parser)]
#[command(
    name = "domlink-bridge",
    about = "Channel-to-DOM dispatch harness for domlink",
    version
)]
struct Cli {
    /// Log per-update diagnostics (unknown channels, malformed values, applied effects).
    #[arg(long, env = "DOMLINK_DEBUG")]
    debug: bool,

    /// TOML route file.  The stock route table is used when absent.
    #[arg(long, value_name = "FILE", env = "DOMLINK_ROUTES")]
    routes: Option<PathBuf>,

    /// Update to apply, as `channel=value`.  May be repeated.  When no update
    /// is given, update lines are read from stdin until EOF or Ctrl+C.
    #[arg(long = "update", value_name = "CHANNEL=VALUE")]
    updates: Vec<String>,

    /// Capacity of the queue carrying observer notifications to stdout.
    #[arg(long, default_value_t = 64, env = "DOMLINK_QUEUE_CAPACITY")]
    queue_capacity: usize,

    /// Element id to leave out of the surface, to exercise missing targets.
    #[arg(long = "omit-element", value_name = "ID")]
    omit_elements: Vec<String>,

    /// Channel whose last applied value is echoed after all updates.
    #[arg(long = "echo", value_name = "CHANNEL")]
    echo: Vec<String>,
}

impl Cli {
    /// Extracts the [`BridgeConfig`] part of the arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if `--queue-capacity` is zero (tokio's bounded queue
    /// requires at least one slot).
    fn bridge_config(&self) -> anyhow::Result<BridgeConfig> {
        if self.queue_capacity == 0 {
            bail!("--queue-capacity must be at least 1");
        }
        Ok(BridgeConfig {
            debug: self.debug,
            routes_path: self.routes.clone(),
            queue_capacity: self.queue_capacity,
        })
    }
}

/// Final line printed by the harness.
#[derive(Debug, Serialize)]
struct SurfaceReport {
    surface: std::collections::BTreeMap<String, ElementState>,
    dropped: u64,
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The handler and its surface are single-threaded (`Rc`), so the harness
/// runs on a current-thread runtime.  The only spawned task is the printer
/// that drains the observer queue to stdout.  Before every update the harness
/// waits for a free queue slot, so no rx/tx line is ever dropped.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins when set; otherwise `--debug` selects the default level.
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.bridge_config()?;

    let routes = match &config.routes_path {
        Some(path) => load_route_file(path)
            .with_context(|| format!("failed to load routes from {}", path.display()))?,
        None => RouteTable::default_routes(),
    };

    let surface = Rc::new(MemorySurface::for_routes(&routes, &cli.omit_elements));
    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let printer = tokio::spawn(print_observed(rx, tokio::io::stdout()));

    let mut handler = DomHandler::new(config.debug, Rc::clone(&surface), routes, QueueObserver::new(tx));
    handler.initialize();

    if cli.updates.is_empty() {
        read_stdin_updates(&mut handler).await?;
    } else {
        for line in &cli.updates {
            feed_line(&mut handler, line).await;
        }
    }

    for channel in &cli.echo {
        if !feed_echo(&handler, channel).await {
            warn!(channel = %channel, "no value to echo");
        }
    }

    let dropped = handler.observer().dropped();
    // Dropping the handler drops the queue sender, which ends the printer.
    drop(handler);
    printer.await.context("printer task panicked")??;

    let report = SurfaceReport {
        surface: surface.snapshot(),
        dropped,
    };
    println!("{}", serde_json::to_string(&report)?);

    info!(dropped, "domlink harness finished");
    Ok(())
}

/// Applies one textual update line.  Returns `false` for a malformed line.
///
/// Malformed lines are logged and skipped; a bad line never stops the run.
fn apply_line<S, O>(handler: &mut DomHandler<S, O>, line: &str) -> bool
where
    S: RenderSurface,
    O: UpdateObserver,
{
    match parse_update_line(line) {
        Ok(Some(update)) => {
            handler.handle_update(update.channel.as_str(), &update.value);
            true
        }
        Ok(None) => true,
        Err(err) => {
            warn!(line, error = %err, "skipping malformed update line");
            false
        }
    }
}

/// Waits for room in the observer queue, then applies one update line.
///
/// An update emits at most one notification, so one free slot guarantees its
/// rx line reaches the printer.
async fn feed_line<S: RenderSurface>(handler: &mut DomHandler<S, QueueObserver>, line: &str) -> bool {
    wait_for_queue(handler).await;
    apply_line(handler, line)
}

/// Waits for room in the observer queue, then echoes one channel.
async fn feed_echo<S: RenderSurface>(handler: &DomHandler<S, QueueObserver>, channel: &str) -> bool {
    wait_for_queue(handler).await;
    handler.echo(channel)
}

async fn wait_for_queue<S: RenderSurface>(handler: &DomHandler<S, QueueObserver>) {
    if handler.observer().ready().await.is_err() {
        warn!("printer has stopped; observer notifications will be dropped");
    }
}

/// Reads update lines from stdin until EOF or Ctrl+C.
async fn read_stdin_updates<S: RenderSurface>(
    handler: &mut DomHandler<S, QueueObserver>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read stdin")? {
                    Some(line) => feed_line(handler, &line).await,
                    None => break,
                };
            }
            _ = &mut ctrl_c => {
                info!("received Ctrl+C, stopping input");
                break;
            }
        }
    }
    Ok(())
}

/// Writes each observed notification to `out` as one JSON line, until every
/// sender is gone.  Returns the writer.
async fn print_observed<W>(mut rx: mpsc::Receiver<ObservedUpdate>, mut out: W) -> anyhow::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(update) = rx.recv().await {
        let mut line = serde_json::to_string(&update)?;
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
    }
    out.flush().await?;
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
