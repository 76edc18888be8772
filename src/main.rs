//! evtcmd - Streaming command listener
//!
//! Reads `>command:data!` frames from stdin or a file and dispatches them to
//! the built-in device commands. Replies go to stdout, logs to stderr.

use clap::Parser;
use evtcmd_host::{build_listener, pump, run_poll_loop, ChannelSource, Config, DeviceContext};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evtcmd")]
#[command(about = "Streaming command listener for byte-oriented input")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "EVTCMD_CONFIG")]
    config: Option<PathBuf>,

    /// Input file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pause before each byte read, in milliseconds (0 disables pacing)
    #[arg(long)]
    read_delay_ms: Option<u64>,

    /// Maximum bytes per command or data field (0 = unlimited)
    #[arg(long)]
    max_field_len: Option<usize>,

    /// Maximum number of command registrations
    #[arg(long)]
    max_commands: Option<usize>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.input {
            config.input.path = Some(path.clone());
        }
        if let Some(ms) = self.read_delay_ms {
            config.scanner.read_delay_ms = ms;
        }
        if let Some(max) = self.max_field_len {
            config.scanner.max_field_len = max;
        }
        if let Some(max) = self.max_commands {
            config.registry.max_commands = max;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load_from(cli.config.as_deref()) {
        Ok(c) => {
            if let Some(path) = &cli.config {
                tracing::info!("Loaded config from {}", path.display());
            }
            c
        }
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!("Starting evtcmd");
    match &config.input.path {
        Some(path) => tracing::info!("  Input: {}", path.display()),
        None => tracing::info!("  Input: stdin"),
    }
    tracing::info!("  Read delay: {}ms", config.scanner.read_delay_ms);
    tracing::info!("  Max field length: {}", config.scanner.max_field_len);
    tracing::info!("  Max commands: {}", config.registry.max_commands);

    let (tx, source) = ChannelSource::channel(64);
    let mut listener = build_listener(&config, source)?;

    let chunk_size = config.input.chunk_size;
    let input_task = match config.input.path.clone() {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            tokio::spawn(pump(file, tx, chunk_size))
        }
        None => tokio::spawn(pump(tokio::io::stdin(), tx, chunk_size)),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping listener...");
            shutdown.store(true, Ordering::Relaxed);
        });
    }

    // The listener owns non-Send handlers, so it polls on this task.
    let result = tokio::task::block_in_place(|| {
        let mut ctx = DeviceContext::new();
        let mut out = std::io::stdout().lock();
        run_poll_loop(
            &mut listener,
            &mut ctx,
            &mut out,
            &shutdown,
            config.poll.idle(),
        )
    });

    let code = match &result {
        Ok(stats) => {
            tracing::info!(
                frames = stats.frames,
                handled = stats.handled,
                unmatched = stats.unmatched,
                spent = stats.spent,
                dropped = stats.dropped,
                "Listener stopped"
            );
            0
        }
        Err(e) => {
            tracing::error!("Listener failed: {}", e);
            1
        }
    };

    if input_task.is_finished() {
        match input_task.await {
            Ok(Ok(total)) => tracing::debug!("Read {} input bytes", total),
            Ok(Err(e)) => tracing::error!("Input error: {}", e),
            Err(e) => tracing::error!("Input task failed: {}", e),
        }
    } else {
        // Stdin reads sit on a blocking thread that cannot be cancelled.
        std::process::exit(code);
    }

    result?;
    Ok(())
}
