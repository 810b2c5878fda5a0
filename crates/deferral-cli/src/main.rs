mod config;
mod logging;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deferral_core::app::{DispatchLoop, Intake};
use deferral_core::impls::{HttpSink, RecordingSink};
use deferral_core::ports::{Sink, SystemClock};
use deferral_core::store::PendingStore;
use tracing::{info, warn};

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "deferral", about = "Hold form posts until their schedule_time, then forward them")]
struct Cli {
    /// Config file (TOML/YAML/JSON). Defaults to ./deferral.* when present.
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Level or filter directives, e.g. `debug` or `deferral_core=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Log payloads instead of sending them downstream.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.poll_interval_ms = ms;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if self.dry_run {
            settings.dry_run = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load_with_path(cli.config.as_deref())?;
    cli.apply(&mut settings);

    logging::setup_logging(&settings.log_level, settings.log_json);
    settings.validate()?;

    let zone = settings.zone()?;
    let addr = settings.bind_addr()?;
    let store = Arc::new(PendingStore::new());
    let clock = Arc::new(SystemClock::new(zone));

    let sink: Arc<dyn Sink> = if settings.dry_run {
        warn!("dry run: payloads are logged, not sent");
        Arc::new(RecordingSink::log_only())
    } else {
        let sink = HttpSink::new(settings.sink.clone()).context("invalid sink configuration")?;
        info!(endpoint = sink.endpoint(), timeout_ms = settings.sink.timeout_ms, "http sink ready");
        Arc::new(sink)
    };

    let intake = Arc::new(Intake::new(Arc::clone(&store), clock.clone(), zone));
    let routes = server::routes(intake, settings.route.clone());

    // Bind before starting dispatch so a taken port fails fast.
    let (bound, serving) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("failed to bind {addr}"))?;

    let dispatch = DispatchLoop::new(Arc::clone(&store), sink, clock)
        .with_interval(settings.poll_interval())
        .spawn();

    info!(
        addr = %bound,
        route = %settings.route,
        zone = zone.name(),
        poll_interval_ms = settings.poll_interval_ms,
        "deferral listening"
    );

    serving.await;
    info!("shutdown requested");

    dispatch.shutdown_and_join().await;

    let discarded = store.len().await;
    if discarded > 0 {
        warn!(discarded, "pending items dropped on shutdown");
    }
    info!("stopped");
    Ok(())
}
