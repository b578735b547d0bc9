//! Bounded queue between loggers and the appender worker.
//!
//! Producers on any thread push records; a single worker pops them. The
//! queue has a hard capacity: when full, `push` either blocks until space
//! frees up or discards the record, per configuration. After [`stop`] new
//! records are discarded while already-queued ones drain, so shutdown never
//! loses what was accepted.
//!
//! [`stop`]: LogQueue::stop

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

struct Inner<T> {
    items: VecDeque<T>,
    stopped: bool,
}

pub struct LogQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    max_size: usize,
    blocking: bool,
    check_interval: Duration,
}

impl<T> LogQueue<T> {
    /// `max_size` is the capacity; `blocking` selects block-vs-discard on
    /// overflow; `check_interval` is how often an idle `pop` wakes up to run
    /// its housekeeping callback.
    pub fn new(max_size: usize, blocking: bool, check_interval: Duration) -> LogQueue<T> {
        LogQueue {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(max_size.min(1024)),
                stopped: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            max_size,
            blocking,
            check_interval,
        }
    }

    /// Queue an item. Returns `false` if it was discarded: the queue is
    /// stopped, or full in non-blocking mode.
    pub fn push(&self, item: T) -> bool {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        while !inner.stopped && inner.items.len() >= self.max_size {
            if !self.blocking {
                return false;
            }
            inner = match self.not_full.wait(inner) {
                Ok(guard) => guard,
                Err(_) => return false,
            };
        }
        if inner.stopped {
            return false;
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        true
    }

    /// Take the next item, blocking while the queue is empty and running.
    /// While blocked, `on_idle` runs once per check interval (with the queue
    /// unlocked). Returns `None` once the queue is stopped and drained.
    pub fn pop(&self, mut on_idle: impl FnMut()) -> Option<T> {
        let mut inner = self.inner.lock().ok()?;
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.stopped {
                return None;
            }
            let (guard, timeout) = self.not_empty.wait_timeout(inner, self.check_interval).ok()?;
            inner = guard;
            if timeout.timed_out() {
                drop(inner);
                on_idle();
                inner = self.inner.lock().ok()?;
            }
        }
    }

    /// Stop the queue: subsequent pushes are discarded and blocked callers
    /// wake up. Queued items remain poppable until drained.
    pub fn stop(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.stopped = true;
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().map(|g| g.items.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn queue(max: usize, blocking: bool) -> Arc<LogQueue<u32>> {
        Arc::new(LogQueue::new(max, blocking, Duration::from_millis(10)))
    }

    #[test]
    fn push_pop_fifo() {
        let q = queue(8, true);
        assert!(q.push(1));
        assert!(q.push(2));
        assert_eq!(q.pop(|| {}), Some(1));
        assert_eq!(q.pop(|| {}), Some(2));
    }

    #[test]
    fn non_blocking_overflow_discards() {
        let q = queue(2, false);
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(!q.push(3));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn push_after_stop_discards() {
        let q = queue(4, true);
        assert!(q.push(1));
        q.stop();
        assert!(!q.push(2));
    }

    #[test]
    fn pop_drains_after_stop() {
        let q = queue(4, true);
        q.push(1);
        q.push(2);
        q.stop();
        assert_eq!(q.pop(|| {}), Some(1));
        assert_eq!(q.pop(|| {}), Some(2));
        assert_eq!(q.pop(|| {}), None);
    }

    #[test]
    fn blocking_push_waits_for_space() {
        let q = queue(1, true);
        assert!(q.push(1));

        let q2 = Arc::clone(&q);
        let producer = thread::spawn(move || q2.push(2));

        // consumer frees the slot; the blocked producer completes
        assert_eq!(q.pop(|| {}), Some(1));
        assert!(producer.join().expect("producer thread"));
        assert_eq!(q.pop(|| {}), Some(2));
    }

    #[test]
    fn stop_unblocks_waiting_producer() {
        let q = queue(1, true);
        assert!(q.push(1));

        let q2 = Arc::clone(&q);
        let producer = thread::spawn(move || q2.push(2));

        thread::sleep(Duration::from_millis(20));
        q.stop();
        // woken by stop and discarded
        assert!(!producer.join().expect("producer thread"));
    }

    #[test]
    fn idle_callback_runs_while_empty() {
        let q = queue(4, true);
        let q2 = Arc::clone(&q);
        let consumer = thread::spawn(move || {
            let mut idles = 0u32;
            let item = q2.pop(|| idles += 1);
            (item, idles)
        });

        thread::sleep(Duration::from_millis(50));
        q.push(7);
        let (item, idles) = consumer.join().expect("consumer thread");
        assert_eq!(item, Some(7));
        assert!(idles >= 1, "expected at least one idle tick, got {idles}");
    }
}
