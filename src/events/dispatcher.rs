// Asynchronous per-listener event dispatcher
//
// A listener-composite: it implements `CacheListener` itself so it can be
// registered into a cache's `SyncRegistry` like any other listener, but
// each event it receives is posted as a command onto a dedicated bounded
// queue per registered listener, consumed by a dedicated worker thread.
// This keeps one slow listener from blocking either the producing thread
// or any other listener's delivery.

use super::{CacheEvent, CacheListener, ListenerHandle};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use uuid::Uuid;

/// Queue depth for each listener's command channel. Once full, new events
/// are dropped (with a logged warning) rather than blocking the producer —
/// a bounded queue that blocked on overflow would just move the head-of-line
/// problem from the listener's worker to the cache's own callers.
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// How often an idle worker wakes to check for a shutdown request.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Worker<K, V> {
    id: Uuid,
    sender: Sender<Arc<CacheEvent<K, V>>>,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

/// Dispatches cache events to listeners asynchronously, one worker thread
/// per registered listener.
pub struct AsyncDispatcher<K, V> {
    workers: Mutex<Vec<Worker<K, V>>>,
}

impl<K, V> AsyncDispatcher<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Register `handle`, spawning a dedicated worker thread for it.
    pub fn add_listener(&self, handle: ListenerHandle<K, V>) {
        let (sender, receiver) = channel::bounded(DEFAULT_QUEUE_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);
        let id = handle.id();
        let listener = handle.listener_arc();
        let join = std::thread::Builder::new()
            .name(format!("cachekit-listener-{id}"))
            .spawn(move || run_worker(receiver, listener, worker_shutdown))
            .expect("failed to spawn listener worker thread");

        self.workers.lock().push(Worker {
            id,
            sender,
            shutdown,
            join: Some(join),
        });
    }

    /// Unregister `handle`: signal its worker to shut down, let it drain
    /// its queue, then join it before returning.
    pub fn remove_listener(&self, handle: &ListenerHandle<K, V>) {
        let worker = {
            let mut workers = self.workers.lock();
            let pos = workers.iter().position(|w| w.id == handle.id());
            pos.map(|i| workers.remove(i))
        };
        if let Some(worker) = worker {
            shut_down(worker);
        }
    }

    /// Shut down every worker, draining each one's queue, then join all of
    /// them. Idempotent: calling `stop` twice is a no-op the second time.
    pub fn stop(&self) {
        let workers: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            shut_down(worker);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.workers.lock().len()
    }
}

fn shut_down<K, V>(worker: Worker<K, V>) {
    worker.shutdown.store(true, Ordering::Release);
    if let Some(join) = worker.join {
        let _ = join.join();
    }
}

fn run_worker<K, V>(
    receiver: Receiver<Arc<CacheEvent<K, V>>>,
    listener: Arc<dyn CacheListener<K, V>>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        match receiver.recv_timeout(DRAIN_POLL_INTERVAL) {
            Ok(event) => dispatch(&listener, &event),
            Err(RecvTimeoutError::Timeout) => {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    // Drain whatever is left in the queue before this worker exits.
    while let Ok(event) = receiver.try_recv() {
        dispatch(&listener, &event);
    }
}

fn dispatch<K, V>(listener: &Arc<dyn CacheListener<K, V>>, event: &CacheEvent<K, V>) {
    let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
    if outcome.is_err() {
        tracing::warn!("async cache listener panicked while handling an event; continuing");
    }
}

impl<K, V> Default for AsyncDispatcher<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheListener<K, V> for AsyncDispatcher<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn on_event(&self, event: &CacheEvent<K, V>) {
        let event = Arc::new(event.clone());
        let workers = self.workers.lock();
        for worker in workers.iter() {
            if worker.sender.try_send(Arc::clone(&event)).is_err() {
                tracing::warn!("async dispatcher queue full; dropping event for a listener");
            }
        }
    }
}

impl<K, V> Drop for AsyncDispatcher<K, V> {
    fn drop(&mut self) {
        let workers: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            shut_down(worker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ListenerHandle;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    struct CountingListener(Arc<AtomicUsize>);

    impl CacheListener<&'static str, i32> for CountingListener {
        fn on_event(&self, _event: &CacheEvent<&'static str, i32>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SlowListener(Arc<AtomicUsize>);

    impl CacheListener<&'static str, i32> for SlowListener {
        fn on_event(&self, event: &CacheEvent<&'static str, i32>) {
            if matches!(event, CacheEvent::Insert(_, _)) {
                std::thread::sleep(Duration::from_millis(10));
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn delivers_events_to_a_registered_listener() {
        let dispatcher: AsyncDispatcher<&'static str, i32> = AsyncDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(ListenerHandle::new(Arc::new(CountingListener(count.clone()))));

        for i in 0..10 {
            dispatcher.on_event(&CacheEvent::Insert("k", i));
        }
        dispatcher.stop();
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn remove_listener_joins_its_worker() {
        let dispatcher: AsyncDispatcher<&'static str, i32> = AsyncDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = ListenerHandle::new(Arc::new(CountingListener(count.clone())));
        dispatcher.add_listener(handle.clone());
        assert_eq!(dispatcher.listener_count(), 1);
        dispatcher.remove_listener(&handle);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn scenario_s6_slow_listener_does_not_block_producer() {
        let dispatcher: AsyncDispatcher<&'static str, i32> = AsyncDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        dispatcher.add_listener(ListenerHandle::new(Arc::new(SlowListener(count.clone()))));

        let start = Instant::now();
        for i in 0..100 {
            dispatcher.on_event(&CacheEvent::Insert("k", i));
        }
        let producing_time = start.elapsed();
        assert!(
            producing_time < Duration::from_millis(100),
            "producing thread blocked for {producing_time:?}"
        );

        dispatcher.stop();
        assert_eq!(count.load(Ordering::SeqCst), 100);
    }
}
