use std::collections::HashMap;
use std::fmt::Debug;
use std::future::poll_fn;
use std::hash::Hash;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::task::{Poll, Waker};

use parking_lot::Mutex;
use tracing::debug;

pub trait BatchLoader {
    type K: Hash + Eq + Clone + Debug + Send + 'static;
    type V: Clone + Send + 'static;

    /// Keys left out of the returned map resolve to `None`.
    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static;
}

enum Entry<V> {
    Requested(Vec<Waker>),
    Ready(Option<V>),
}

struct LoaderInner<B: BatchLoader> {
    values: HashMap<B::K, Entry<B::V>>,
    pending_keys: HashMap<B::K, Vec<Waker>>,
    load_batch: B,
}

type BatchFuture<K, V> = Pin<Box<dyn Future<Output = HashMap<K, V>> + Send>>;

/// Collects the keys requested while the wrapped future is blocked and resolves them in one batch.
///
/// Resolved values are cached for the lifetime of the loader, which is one request.
pub struct DataLoader<B: BatchLoader> {
    inner: Arc<Mutex<LoaderInner<B>>>,
}

impl<B: BatchLoader> Clone for DataLoader<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: BatchLoader> DataLoader<B> {
    pub fn new(load_batch: B) -> Self {
        let inner = LoaderInner {
            load_batch,
            values: Default::default(),
            pending_keys: Default::default(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Only makes progress while running inside [`DataLoader::wrap`].
    pub fn load(&self, key: B::K) -> impl Future<Output = Option<B::V>> {
        poll_fn(move |cx| {
            let mut inner = self.inner.lock();

            let wakers = match inner.values.get_mut(&key) {
                Some(Entry::Ready(v)) => {
                    return Poll::Ready(v.clone());
                }
                Some(Entry::Requested(wakers)) => wakers,
                None => inner.pending_keys.entry(key.clone()).or_insert_with(|| {
                    debug!(?key, "queueing key for the next batch");
                    vec![]
                }),
            };

            wakers.push(cx.waker().clone());
            Poll::Pending
        })
    }

    /// Drops a cached value so the next `load` goes back to the source.
    ///
    /// Keys that are still in flight are left alone.
    pub fn forget(&self, key: &B::K) {
        let mut inner = self.inner.lock();
        if matches!(inner.values.get(key), Some(Entry::Ready(_))) {
            inner.values.remove(key);
        }
    }

    pub async fn wrap<O>(&self, fut: impl Future<Output = O>) -> O {
        let mut currently_loading: Option<(Vec<B::K>, BatchFuture<B::K, B::V>)> = None;

        let mut fut = pin!(fut);
        poll_fn(move |cx| {
            if let Some((keys, batch)) = &mut currently_loading {
                match batch.as_mut().poll(cx) {
                    Poll::Ready(mut values) => {
                        let mut inner = self.inner.lock();

                        // Wake all the `load` calls waiting on this batch
                        for k in keys.drain(..) {
                            let v = values.remove(&k);
                            if let Some(Entry::Requested(wakers)) =
                                inner.values.insert(k, Entry::Ready(v))
                            {
                                for w in wakers {
                                    w.wake();
                                }
                            }
                        }

                        currently_loading = None;
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let res = fut.as_mut().poll(cx);
            if res.is_pending() {
                // We have polled the inner future once, during which it may have registered more
                // keys to load.
                let mut inner = self.inner.lock();

                if !inner.pending_keys.is_empty() {
                    let mut keys = Vec::with_capacity(inner.pending_keys.len());
                    for (k, v) in std::mem::take(&mut inner.pending_keys) {
                        keys.push(k.clone());
                        inner.values.insert(k, Entry::Requested(v));
                    }

                    let batch: BatchFuture<B::K, B::V> =
                        Box::pin(inner.load_batch.load_batch(keys.clone()));
                    currently_loading = Some((keys, batch));

                    // Wake immediately, to instruct the runtime to call `poll` again.
                    cx.waker().wake_by_ref();
                }
            }
            res
        })
        .await
    }
}
