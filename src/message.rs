use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::WaitError;
use crate::spec::TargetSpec;

/// Wait operation status.
///
/// `Start` is emitted exactly once per target, followed by exactly one of
/// `Ready` or `Failed` as that target's terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Start,
    Ready,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Start => "waiting",
            Status::Ready => "ready",
            Status::Failed => "failed",
        };
        // pad() keeps width specifiers working, e.g. "{:>7}"
        f.pad(s)
    }
}

/// One status transition for one target, or the synthetic aggregate timeout
/// failure when no target is attached.
#[derive(Debug)]
pub struct ProbeEvent {
    status: Status,
    spec: Option<Arc<TargetSpec>>,
    start_time: Instant,
    emit_time: Instant,
    error: Option<WaitError>,
}

impl ProbeEvent {
    pub(crate) fn start(spec: Arc<TargetSpec>, start_time: Instant) -> Self {
        Self {
            status: Status::Start,
            spec: Some(spec),
            start_time,
            emit_time: Instant::now(),
            error: None,
        }
    }

    pub(crate) fn ready(spec: Arc<TargetSpec>, start_time: Instant) -> Self {
        Self {
            status: Status::Ready,
            spec: Some(spec),
            start_time,
            emit_time: Instant::now(),
            error: None,
        }
    }

    pub(crate) fn failed(
        spec: Option<Arc<TargetSpec>>,
        start_time: Instant,
        error: WaitError,
    ) -> Self {
        Self {
            status: Status::Failed,
            spec,
            start_time,
            emit_time: Instant::now(),
            error: Some(error),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The spec of the target this event belongs to, absent only for the
    /// synthetic aggregate timeout failure.
    pub fn spec(&self) -> Option<&TargetSpec> {
        self.spec.as_deref()
    }

    /// Human-displayable identifier of the entity being waited on, e.g.
    /// `tcp://localhost:5432`, or `<none>` when no target is attached.
    pub fn target(&self) -> String {
        match &self.spec {
            Some(spec) => format!("tcp://{}", spec.addr()),
            None => "<none>".to_string(),
        }
    }

    /// Duration between operation start and this event's emission.
    pub fn elapsed(&self) -> Duration {
        self.emit_time.duration_since(self.start_time)
    }

    pub fn error(&self) -> Option<&WaitError> {
        self.error.as_ref()
    }
}
