use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::sleep;

use waitup::{ProbeEvent, Status, TargetSpec, WaitError, wait_all, wait_specs};

fn spec(host: &str, port: u16, poll: Duration) -> TargetSpec {
    TargetSpec {
        host: host.to_string(),
        port,
        poll_interval: poll,
    }
}

/// Binds to an ephemeral port and releases it, so tests get a local port
/// that (very likely) refuses connections until rebound.
async fn free_local_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn collect(mut events: mpsc::Receiver<ProbeEvent>) -> Vec<ProbeEvent> {
    let mut all = Vec::new();
    while let Some(event) = events.recv().await {
        all.push(event);
    }
    all
}

#[tokio::test(flavor = "multi_thread")]
async fn ready_target_yields_start_then_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let timeout = Duration::from_secs(5);

    let events = wait_specs(
        vec![spec("127.0.0.1", port, Duration::from_millis(100))],
        timeout,
    );
    let events = collect(events).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status(), Status::Start);
    assert_eq!(events[1].status(), Status::Ready);
    assert!(events[1].elapsed() < timeout);
    assert_eq!(events[1].target(), format!("tcp://127.0.0.1:{port}"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delayed_listener_is_waited_for() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ready_port = listener.local_addr().unwrap().port();

    let late_port = free_local_port().await;
    tokio::spawn(async move {
        sleep(Duration::from_millis(300)).await;
        let late = TcpListener::bind(("127.0.0.1", late_port)).await.unwrap();
        // hold the socket open until the test finishes
        sleep(Duration::from_secs(60)).await;
        drop(late);
    });

    let poll = Duration::from_millis(100);
    let events = wait_specs(
        vec![
            spec("127.0.0.1", ready_port, poll),
            spec("127.0.0.1", late_port, poll),
        ],
        Duration::from_secs(5),
    );
    let events = collect(events).await;

    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.status() != Status::Failed));
    assert!(events.iter().all(|e| e.spec().is_some()));

    // strict order within each target's stream
    for port in [ready_port, late_port] {
        let target = format!("tcp://127.0.0.1:{port}");
        let statuses: Vec<_> = events
            .iter()
            .filter(|e| e.target() == target)
            .map(|e| e.status())
            .collect();
        assert_eq!(statuses, vec![Status::Start, Status::Ready]);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn deadline_cancels_probe_and_appends_synthetic_failure() {
    let port = free_local_port().await;
    let timeout = Duration::from_millis(500);

    let events = wait_specs(
        vec![spec("127.0.0.1", port, Duration::from_millis(100))],
        timeout,
    );
    let events = collect(events).await;

    assert_eq!(events[0].status(), Status::Start);

    // the target's own terminal message: cancelled at the deadline
    let cancelled = &events[1];
    assert_eq!(cancelled.status(), Status::Failed);
    assert!(cancelled.spec().is_some());
    assert!(matches!(cancelled.error(), Some(WaitError::Cancelled)));
    assert!(cancelled.elapsed() >= timeout);

    // the synthetic aggregate failure closes the stream
    let synthetic = events.last().unwrap();
    assert_eq!(synthetic.status(), Status::Failed);
    assert!(synthetic.spec().is_none());
    assert_eq!(synthetic.target(), "<none>");
    assert!(matches!(
        synthetic.error(),
        Some(WaitError::DeadlineExceeded(_))
    ));
    assert!(synthetic.elapsed() >= timeout);

    assert_eq!(events.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn unresolvable_host_fails_without_retrying_forever() {
    // not a valid IP and not a resolvable name
    let events = wait_specs(
        vec![spec("256.256.256.256", 80, Duration::from_millis(200))],
        Duration::from_secs(2),
    );
    let events = collect(events).await;

    assert_eq!(events[0].status(), Status::Start);
    let terminal = events
        .iter()
        .find(|e| e.status() == Status::Failed)
        .expect("expected a Failed event");
    assert!(terminal.error().is_some());
    assert!(events.iter().all(|e| e.status() != Status::Ready));
}

#[tokio::test(flavor = "multi_thread")]
async fn wait_all_rejects_bad_addresses_before_probing() {
    let err = wait_all(
        &["127.0.0.1:1234", "localhost"],
        Duration::from_millis(100),
        Duration::from_secs(1),
    )
    .err()
    .expect("expected a parse error");
    assert!(err.to_string().contains("position 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_poll_interval_is_rejected_before_probing() {
    // must fail synchronously; a zero interval would otherwise kill the
    // prober task and close its stream without a terminal event
    let err = wait_all(
        &["127.0.0.1:1#0"],
        Duration::from_millis(100),
        Duration::from_secs(1),
    )
    .err()
    .expect("expected a parse error");
    assert!(err.to_string().contains("invalid poll interval"));
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_stream_tears_probes_down() {
    let port = free_local_port().await;
    let mut events = wait_specs(
        vec![spec("127.0.0.1", port, Duration::from_millis(50))],
        Duration::from_secs(30),
    );

    let first = events.recv().await.unwrap();
    assert_eq!(first.status(), Status::Start);
    drop(events);

    // probers observe the dropped cancellation channel well before the
    // 30s deadline; give the cascade a moment and make sure nothing hangs
    sleep(Duration::from_millis(200)).await;
}
