use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::debug;

use crate::error::{ParseError, WaitError};
use crate::merge::merge;
use crate::message::ProbeEvent;
use crate::probe;
use crate::spec::{self, TargetSpec};

/// Waits until connections can be made to all given addresses, for at most
/// `overall_timeout`.
///
/// Addresses are parsed first; a parse failure is returned synchronously and
/// nothing is probed. On success the returned stream carries, per target, a
/// `Start` event followed by exactly one `Ready` or `Failed`, and closes once
/// every target is settled. If the timeout elapses first, all in-flight
/// probes are cancelled (each reporting its own `Failed`) and one final
/// synthetic `Failed` without a target closes the stream.
///
/// Must be called from within a tokio runtime.
pub fn wait_all<S: AsRef<str>>(
    raw_addrs: &[S],
    default_poll: Duration,
    overall_timeout: Duration,
) -> Result<mpsc::Receiver<ProbeEvent>, ParseError> {
    let specs = spec::parse_all(raw_addrs, default_poll)?;
    Ok(wait_specs(specs, overall_timeout))
}

/// Same as [`wait_all`], starting from already-parsed specs.
///
/// All probers share one start time and one cancellation channel. Dropping
/// the returned receiver before it closes cancels the whole operation.
pub fn wait_specs(specs: Vec<TargetSpec>, overall_timeout: Duration) -> mpsc::Receiver<ProbeEvent> {
    let start_time = Instant::now();
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let streams: Vec<_> = specs
        .into_iter()
        .map(|spec| probe::spawn(Arc::new(spec), start_time, cancel_rx.clone()))
        .collect();
    drop(cancel_rx);

    let mut merged = merge(streams);
    let (out_tx, out_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let deadline = time::sleep(overall_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("overall timeout elapsed, cancelling probes");
                    let _ = cancel_tx.send(true);

                    // Every prober reports its own cancellation before the
                    // synthetic aggregate failure closes the stream.
                    while let Some(event) = merged.recv().await {
                        if out_tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    let _ = out_tx
                        .send(ProbeEvent::failed(
                            None,
                            start_time,
                            WaitError::DeadlineExceeded(overall_timeout),
                        ))
                        .await;
                    return;
                }
                event = merged.recv() => match event {
                    Some(event) => {
                        // A dropped receiver aborts the wait; returning drops
                        // cancel_tx, which every prober observes as
                        // cancellation.
                        if out_tx.send(event).await.is_err() {
                            debug!("consumer gone, tearing down probes");
                            return;
                        }
                    }
                    None => return,
                },
            }
        }
    });

    out_rx
}
