use std::io;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use crate::error::WaitError;
use crate::message::ProbeEvent;
use crate::spec::TargetSpec;

/// Outcome of a single connection attempt.
enum Attempt {
    Ready,
    /// Attempt timed out or the connection was refused; retry at the next
    /// poll tick.
    Retry,
    /// Any other error (resolution failure, network unreachable, ...) ends
    /// the wait for this target.
    Failed(io::Error),
}

/// Spawns the wait task for one target and returns its event stream.
///
/// The stream carries `Start` followed by exactly one `Ready` or `Failed`,
/// then closes. The task is the sole writer. Cancellation is observed through
/// `cancel` at every suspension point, including mid-attempt; a closed channel
/// counts as cancellation so that dropping the sender tears probers down.
pub(crate) fn spawn(
    spec: Arc<TargetSpec>,
    start_time: Instant,
    mut cancel: watch::Receiver<bool>,
) -> mpsc::Receiver<ProbeEvent> {
    let (tx, rx) = mpsc::channel(2);

    tokio::spawn(async move {
        let _ = tx.send(ProbeEvent::start(spec.clone(), start_time)).await;

        let mut poll = time::interval(spec.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately, so the first attempt does
            // not wait for a full interval.
            tokio::select! {
                _ = cancel.changed() => {
                    let _ = tx
                        .send(ProbeEvent::failed(Some(spec.clone()), start_time, WaitError::Cancelled))
                        .await;
                    return;
                }
                _ = poll.tick() => {}
            }

            tokio::select! {
                _ = cancel.changed() => {
                    let _ = tx
                        .send(ProbeEvent::failed(Some(spec.clone()), start_time, WaitError::Cancelled))
                        .await;
                    return;
                }
                outcome = attempt(&spec) => match outcome {
                    Attempt::Ready => {
                        debug!(target_addr = %spec.addr(), "connection established");
                        let _ = tx.send(ProbeEvent::ready(spec.clone(), start_time)).await;
                        return;
                    }
                    Attempt::Retry => {
                        trace!(target_addr = %spec.addr(), "not ready yet, will retry");
                    }
                    Attempt::Failed(err) => {
                        debug!(target_addr = %spec.addr(), error = %err, "connect failed");
                        let _ = tx
                            .send(ProbeEvent::failed(Some(spec.clone()), start_time, err.into()))
                            .await;
                        return;
                    }
                },
            }
        }
    });

    rx
}

/// One connection attempt, bounded by the target's own poll interval.
async fn attempt(spec: &TargetSpec) -> Attempt {
    match time::timeout(spec.poll_interval, TcpStream::connect(spec.addr())).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Attempt::Ready
        }
        Ok(Err(err)) if should_wait(&err) => Attempt::Retry,
        Ok(Err(err)) => Attempt::Failed(err),
        // The attempt's own I/O timeout elapsed.
        Err(_) => Attempt::Retry,
    }
}

/// Whether a failed attempt is a condition under which we should keep
/// waiting: I/O timeouts and connection-refused (remote socket exists but
/// nothing is listening yet).
fn should_wait(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_and_timeout_are_transient() {
        assert!(should_wait(&io::Error::from(io::ErrorKind::ConnectionRefused)));
        assert!(should_wait(&io::Error::from(io::ErrorKind::TimedOut)));
    }

    #[test]
    fn other_errors_are_definitive() {
        assert!(!should_wait(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!should_wait(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
