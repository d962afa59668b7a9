//! Debounced topic suggestions.
//!
//! Every keystroke issues a new generation. A fetch only runs once its
//! generation has survived the quiet window, and its result is dropped if a
//! newer keystroke arrived while the request was in flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

/// Monotonic generation counter. Only the latest ticket is current.
#[derive(Debug, Default)]
pub struct SuggestionSequencer {
    latest: AtomicU64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl SuggestionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Wait `window`, then run `fetch` if `ticket` is still the latest.
/// Returns None when superseded before or during the fetch.
pub async fn debounced<F, Fut, T>(
    sequencer: &SuggestionSequencer,
    ticket: Ticket,
    window: Duration,
    fetch: F,
) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    tokio::time::sleep(window).await;
    if !sequencer.is_current(ticket) {
        debug!(target: "testsmith", ?ticket, "suggestion superseded during debounce");
        return None;
    }
    let out = fetch().await;
    if !sequencer.is_current(ticket) {
        debug!(target: "testsmith", ?ticket, "suggestion superseded in flight");
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn newer_ticket_supersedes() {
        let seq = SuggestionSequencer::new();
        let a = seq.issue();
        assert!(seq.is_current(a));
        let b = seq.issue();
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_keystroke_fetches() {
        let seq = Arc::new(SuggestionSequencer::new());
        let first = {
            let seq = seq.clone();
            let t = seq.issue();
            tokio::spawn(async move { debounced(&seq, t, Duration::from_millis(800), || async { "r" }).await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        let t = seq.issue();
        let second = debounced(&seq, t, Duration::from_millis(800), || async { "ra" }).await;
        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second, Some("ra"));
    }

    #[tokio::test(start_paused = true)]
    async fn result_dropped_when_superseded_in_flight() {
        let seq = Arc::new(SuggestionSequencer::new());
        let t = seq.issue();
        let inner = seq.clone();
        let out = debounced(&seq, t, Duration::from_millis(10), || async move {
            inner.issue();
            vec!["stale".to_string()]
        })
        .await;
        assert_eq!(out, None);
    }
}
