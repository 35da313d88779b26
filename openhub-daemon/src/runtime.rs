use std::sync::Arc;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use openhub_core::Configuration;
use openhub_sync::{connect, run_pass, SyncContext, SyncState};

use crate::error::DaemonError;

/// Build a multi-threaded runtime and block the current thread on [`run`].
pub fn start_blocking(config: Configuration) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(config))
}

/// Connect the collaborators and run the scheduler until it finishes
/// (single-shot) or the process receives ctrl-c.
pub async fn run(config: Configuration) -> Result<(), DaemonError> {
    let ctx = connect(config)?;
    let state = Arc::new(SyncState::new());

    tokio::select! {
        result = schedule(ctx, state) => result,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                tracing::info!("received ctrl-c, shutting down");
                Ok(())
            }
            Err(err) => Err(DaemonError::Signal(err)),
        },
    }
}

/// Run one pass now, then one per interval.
///
/// Passes after the first run in the background. A tick that finds the
/// previous pass still in flight is dropped, not queued. Only returns in
/// single-shot mode or on a zero interval.
pub async fn schedule(ctx: SyncContext, state: Arc<SyncState>) -> Result<(), DaemonError> {
    let period = ctx.config.options.interval;
    if period.is_zero() && !ctx.config.options.single_shot {
        return Err(DaemonError::ZeroInterval);
    }

    run_pass(&ctx, &state).await;
    if ctx.config.options.single_shot {
        tracing::info!("Only one execution was needed, stopping...");
        return Ok(());
    }

    tracing::info!(interval_secs = period.as_secs(), "Listening...");
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !state.try_begin_pass() {
            tracing::warn!("Previous execution is not done, waiting...");
            continue;
        }

        let ctx = ctx.clone();
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            run_pass(&ctx, &state).await;
        });
    }
}

/// Install the global `tracing` subscriber (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
