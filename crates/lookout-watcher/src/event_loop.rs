//! The background task that turns file notifications into refreshes.

use crate::host::RefreshHost;
use crate::source::{ChangeEvent, SourceStreams};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// Consumes `streams` until cancelled, asking `host` to refresh on
/// every meaningful change.
///
/// Events that arrive while a refresh is running are dropped, not
/// queued. Errors are logged and never stop the loop; it only ends on
/// cancellation or once both streams have closed.
pub async fn run<H: RefreshHost>(
    mut streams: SourceStreams,
    host: Arc<H>,
    cancel: CancellationToken,
) {
    debug!("File watch event loop started");

    let mut events_closed = false;
    let mut errors_closed = false;

    while !(events_closed && errors_closed) {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("File watch event loop cancelled");
                return;
            }
            maybe_event = streams.events.recv(), if !events_closed => match maybe_event {
                Some(event) => handle_event(&event, host.as_ref()),
                None => {
                    debug!("Event stream closed");
                    events_closed = true;
                }
            },
            maybe_err = streams.errors.recv(), if !errors_closed => match maybe_err {
                Some(err) => error!("Watch error: {}", err),
                None => {
                    debug!("Error stream closed");
                    errors_closed = true;
                }
            },
        }
    }

    debug!("Notification streams closed, stopping event loop");
}

fn handle_event<H: RefreshHost>(event: &ChangeEvent, host: &H) {
    if event.is_noise() {
        // Permission-only changes show up even when nothing was touched
        trace!("Ignoring metadata event for {:?}", event.paths);
        return;
    }

    if host.is_refreshing_files() {
        trace!("Refresh already running, dropping {:?}", event.kind);
        return;
    }

    debug!("{:?} on {:?}, refreshing files", event.kind, event.paths);
    host.refresh_files();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use crate::source::{channel, ChangeKind};
    use crate::testing::CountingHost;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_change_triggers_one_refresh() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::default());

        tx.send_event(ChangeEvent::new(ChangeKind::Modify, "/repo/a.txt"));
        drop(tx);
        run(streams, host.clone(), CancellationToken::new()).await;

        assert_eq!(host.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_each_change_evaluated_separately() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::default());

        tx.send_event(ChangeEvent::new(ChangeKind::Create, "/repo/a.txt"));
        tx.send_event(ChangeEvent::new(ChangeKind::Remove, "/repo/b.txt"));
        drop(tx);
        run(streams, host.clone(), CancellationToken::new()).await;

        // The counting host never sets its own flag
        assert_eq!(host.refreshes(), 2);
    }

    #[tokio::test]
    async fn test_metadata_events_ignored() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::default());

        tx.send_event(ChangeEvent::new(ChangeKind::Metadata, "/repo/a.txt"));
        drop(tx);
        run(streams, host.clone(), CancellationToken::new()).await;

        assert_eq!(host.refreshes(), 0);
    }

    #[tokio::test]
    async fn test_no_refresh_while_refreshing() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::busy());

        tx.send_event(ChangeEvent::new(ChangeKind::Modify, "/repo/a.txt"));
        drop(tx);
        run(streams, host.clone(), CancellationToken::new()).await;

        assert_eq!(host.refreshes(), 0);
    }

    #[tokio::test]
    async fn test_dropped_event_not_replayed() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::busy());
        let handle = tokio::spawn(run(streams, host.clone(), CancellationToken::new()));

        tx.send_event(ChangeEvent::new(ChangeKind::Modify, "/repo/a.txt"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        host.refreshing.store(false, Ordering::SeqCst);
        tx.send_event(ChangeEvent::new(ChangeKind::Modify, "/repo/b.txt"));
        drop(tx);
        handle.await.unwrap();

        assert_eq!(host.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_loop() {
        let (tx, streams) = channel();
        let host = Arc::new(CountingHost::default());

        tx.send_error(WatchError::Source("boom".into()));
        tx.send_event(ChangeEvent::new(ChangeKind::Modify, "/repo/a.txt"));
        drop(tx);
        run(streams, host.clone(), CancellationToken::new()).await;

        assert_eq!(host.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_loop_outlives_closed_event_stream() {
        let (events_tx, events) = unbounded_channel::<ChangeEvent>();
        let (errors_tx, errors) = unbounded_channel();
        let streams = SourceStreams { events, errors };
        let host = Arc::new(CountingHost::default());
        let handle = tokio::spawn(run(streams, host, CancellationToken::new()));

        drop(events_tx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        errors_tx.send(WatchError::Source("boom".into())).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        drop(errors_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("event loop did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_loop_outlives_closed_error_stream() {
        let (events_tx, events) = unbounded_channel();
        let (errors_tx, errors) = unbounded_channel::<WatchError>();
        let streams = SourceStreams { events, errors };
        let host = Arc::new(CountingHost::default());
        let handle = tokio::spawn(run(streams, host.clone(), CancellationToken::new()));

        drop(errors_tx);
        events_tx
            .send(ChangeEvent::new(ChangeKind::Modify, "/repo/a.txt"))
            .unwrap();
        drop(events_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("event loop did not stop")
            .unwrap();

        assert_eq!(host.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_loop() {
        let (_tx, streams) = channel();
        let host = Arc::new(CountingHost::default());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(streams, host, cancel.clone()));

        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("event loop did not stop")
            .unwrap();
    }
}
