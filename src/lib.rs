//! Waiting on TCP servers to become ready to accept connections.
//!
//! The main use case is making applications that depend on external services
//! more robust: run the wait as a pre-flight gate, start the dependent
//! process only once everything it needs is reachable.
//!
//! [`wait_all`] parses compact address specs like `localhost:5432`,
//! `https://example.com` or `mysql://db#3s`, probes every target
//! concurrently, and yields one interleaved stream of [`ProbeEvent`]s bounded
//! by a single overall deadline.

pub mod duration;
pub mod error;
pub mod merge;
pub mod message;
mod probe;
pub mod spec;
mod wait;

pub use error::{ParseError, WaitError};
pub use message::{ProbeEvent, Status};
pub use spec::{TargetSpec, parse, parse_all};
pub use wait::{wait_all, wait_specs};
