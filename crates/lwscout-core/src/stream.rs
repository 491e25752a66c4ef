// ── Reactive view stream ──
//
// Subscription type for consuming aggregate view changes from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::AggregateView;

/// A subscription to the aggregate view.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct ViewStream {
    current: Arc<AggregateView>,
    receiver: watch::Receiver<Arc<AggregateView>>,
}

impl ViewStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<AggregateView>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The view captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<AggregateView> {
        &self.current
    }

    /// The latest view (may have changed since creation).
    pub fn latest(&self) -> Arc<AggregateView> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new view.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<AggregateView>> {
        self.receiver.changed().await.ok()?;
        let view = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&view);
        Some(view)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The first item is the current view.
    pub fn into_stream(self) -> ViewWatchStream {
        ViewWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ViewWatchStream {
    inner: WatchStream<Arc<AggregateView>>,
}

impl Stream for ViewWatchStream {
    type Item = Arc<AggregateView>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
