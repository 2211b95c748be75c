use std::time::Duration;

use anyhow::{Context, Result};
use tokio::select;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::tasks::pipeline::CompressionPipeline;

/// Host loop for the tick context.
///
/// Rules:
/// - Each tick runs on a blocking thread; the pipeline moves in and back out,
///   so two ticks can never overlap.
/// - A tick that processed a request is followed straight away by another;
///   the driver only waits for the next interval once the queue is empty.
/// - On cancellation the pipeline is dropped, which fails any stranded
///   requests with `ServiceStopped`.
#[instrument(skip_all, fields(tick_ms = tick_interval.as_millis() as u64))]
pub async fn run(
    mut pipeline: CompressionPipeline,
    tick_interval: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; stopping compression driver");
                break;
            }

            _ = ticker.tick() => {
                while !cancel.is_cancelled() {
                    let (returned, report) = tokio::task::spawn_blocking(move || {
                        let report = pipeline.tick();
                        (pipeline, report)
                    })
                    .await
                    .context("compression tick panicked")?;
                    pipeline = returned;

                    match report {
                        Some(report) => debug!(?report, "tick processed request"),
                        None => break,
                    }
                }
            }
        }
    }
    Ok(())
}
