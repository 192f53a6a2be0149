//! Progress reporting and cooperative cancellation for the crawl loop
//!
//! The crawl loop is the single producer of [`CrawlEvent`]s; a front-end
//! (CLI progress bar, GUI) consumes them from the other side of a bounded
//! channel so the core pipeline stays free of UI concerns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sender half of the crawl progress channel
pub type ProgressSender = tokio::sync::mpsc::Sender<CrawlEvent>;

/// Receiver half of the crawl progress channel
pub type ProgressReceiver = tokio::sync::mpsc::Receiver<CrawlEvent>;

/// Create a bounded progress channel
pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    tokio::sync::mpsc::channel(capacity)
}

/// Events emitted by the crawl loop, one producer / one consumer
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// A URL was dequeued and is about to be fetched
    Fetching {
        /// URL being fetched
        url: String,
    },

    /// A page was accepted into the knowledge base
    PageAdded {
        /// URL of the page
        url: String,
        /// Extracted page title
        title: String,
        /// Number of pages accepted so far
        pages_so_far: usize,
    },

    /// A page was fetched but discarded before assembly
    PageSkipped {
        /// URL of the page
        url: String,
        /// Why the page was discarded
        reason: String,
    },

    /// A page could not be fetched or parsed
    PageFailed {
        /// URL of the page
        url: String,
        /// Error description
        error: String,
    },

    /// The crawl finished
    Finished {
        /// Pages accepted into the knowledge base
        pages: usize,
        /// Pages discarded for insufficient content
        skipped: usize,
        /// Pages that failed to fetch or parse
        failed: usize,
    },
}

/// Cooperative cancellation flag, checked once per page boundary
///
/// Safe to share between the crawl worker and an observer thread; in-flight
/// fetch or AI calls are allowed to finish on their own timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());

        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
