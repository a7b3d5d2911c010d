//! Search debounce
//!
//! Two renditions of the same rule, "only the last input of a burst is
//! evaluated": [`debounce`] over a timestamped input sequence, and the
//! [`DebouncedSearch`] worker that applies it to live keystrokes.

use super::{SearchIndex, Suggestions};
use crate::menu::MenuCatalog;
use std::iter::Peekable;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Lazy debounced view over `(offset, value)` inputs
///
/// A value is yielded when the next input arrives at least `window` later,
/// or when it is the last input. Cloning restarts from the same position.
pub struct Debounced<I: Iterator> {
    inner: Peekable<I>,
    window: Duration,
}

impl<I> Clone for Debounced<I>
where
    I: Iterator + Clone,
    I::Item: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            window: self.window,
        }
    }
}

impl<I, T> Iterator for Debounced<I>
where
    I: Iterator<Item = (Duration, T)>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let (at, value) = self.inner.next()?;
            match self.inner.peek() {
                Some((next_at, _)) if next_at.saturating_sub(at) < self.window => continue,
                _ => return Some(value),
            }
        }
    }
}

/// Debounce a sequence of inputs stamped with their offset from the start
///
/// Offsets are expected to be non-decreasing.
pub fn debounce<I, T>(inputs: I, window: Duration) -> Debounced<I::IntoIter>
where
    I: IntoIterator<Item = (Duration, T)>,
{
    Debounced {
        inner: inputs.into_iter().peekable(),
        window,
    }
}

#[derive(Debug)]
enum SearchCommand {
    Input(String),
    Clear,
}

/// Background search worker fed by keystrokes
///
/// Each input pushes the evaluation deadline back by `window`; results are
/// published on a watch channel.
#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    tx: mpsc::UnboundedSender<SearchCommand>,
    results: watch::Receiver<Suggestions>,
    evaluations: Arc<AtomicU64>,
}

impl DebouncedSearch {
    /// Spawn the worker; it stops on `shutdown` or when every handle is dropped
    pub fn spawn(
        menu: watch::Receiver<Arc<MenuCatalog>>,
        window: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (results_tx, results) = watch::channel(Suggestions::default());
        let evaluations = Arc::new(AtomicU64::new(0));

        let worker = SearchWorker {
            menu,
            window,
            results: results_tx,
            evaluations: evaluations.clone(),
        };
        tokio::spawn(worker.run(rx, shutdown));

        Self {
            tx,
            results,
            evaluations,
        }
    }

    /// Keystroke: reschedule evaluation for `text`
    pub fn input(&self, text: impl Into<String>) {
        if self.tx.send(SearchCommand::Input(text.into())).is_err() {
            tracing::debug!("Search worker stopped, input ignored");
        }
    }

    /// Drop any pending evaluation and hide suggestions
    pub fn clear(&self) {
        if self.tx.send(SearchCommand::Clear).is_err() {
            tracing::debug!("Search worker stopped, clear ignored");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.results.clone()
    }

    pub fn current(&self) -> Suggestions {
        self.results.borrow().clone()
    }

    /// Number of filter evaluations run so far
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }
}

struct SearchWorker {
    menu: watch::Receiver<Arc<MenuCatalog>>,
    window: Duration,
    results: watch::Sender<Suggestions>,
    evaluations: Arc<AtomicU64>,
}

impl SearchWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<SearchCommand>, shutdown: CancellationToken) {
        tracing::debug!(window_ms = self.window.as_millis() as u64, "Search worker started");

        let mut pending: Option<String> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let sleep_until = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = shutdown.cancelled() => break,

                _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                    deadline = None;
                    if let Some(text) = pending.take() {
                        self.evaluate(&text);
                    }
                }

                cmd = rx.recv() => match cmd {
                    Some(SearchCommand::Input(text)) => {
                        pending = Some(text);
                        deadline = Some(Instant::now() + self.window);
                    }
                    Some(SearchCommand::Clear) => {
                        pending = None;
                        deadline = None;
                        self.results.send_replace(Suggestions::default());
                    }
                    None => break,
                },
            }
        }

        tracing::debug!("Search worker stopped");
    }

    fn evaluate(&self, text: &str) {
        let index = SearchIndex::new(self.menu.borrow().clone());
        let suggestions = index.suggest(text);
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(query = %suggestions.query, hits = suggestions.items.len(), "Search evaluated");
        self.results.send_replace(suggestions);
    }
}
