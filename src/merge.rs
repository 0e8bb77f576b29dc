use tokio::sync::mpsc;

/// Fans-in any number of channels into one.
///
/// One forwarding task per input keeps per-input order intact while imposing
/// no ordering across inputs; a forwarder blocked on a slow consumer does not
/// stall the others. Each forwarder holds a clone of the output sender, so
/// the output closes exactly when the last input has closed — the sender
/// refcount is the open-stream counter. Zero inputs close the output
/// immediately.
pub fn merge<T: Send + 'static>(inputs: Vec<mpsc::Receiver<T>>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(1);

    for mut input in inputs {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(msg) = input.recv().await {
                // Receiver gone: stop forwarding, the producer will notice
                // its own channel closing.
                if tx.send(msg).await.is_err() {
                    return;
                }
            }
        });
    }

    rx
}
