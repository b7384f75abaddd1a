use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Bounded FIFO shared by producers and the coordinator.
///
/// `try_push` never blocks; `pop` blocks until an item exists.
pub(crate) struct ActionQueue<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
    capacity: usize,
}

impl<T> ActionQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hands the item back when the queue is at capacity.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let mut items = self.lock();
        if items.len() >= self.capacity {
            return Err(item);
        }
        items.push_back(item);
        self.ready.notify_one();
        Ok(())
    }

    /// Push ignoring capacity, for control items
    pub fn force_push(&self, item: T) {
        self.lock().push_back(item);
        self.ready.notify_one();
    }

    pub fn pop(&self) -> T {
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self.ready.wait(items).unwrap_or_else(|e| e.into_inner());
        }
    }

    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = ActionQueue::new(8);
        for i in 0..5 {
            queue.try_push(i).unwrap();
        }
        let popped: Vec<i32> = (0..5).map(|_| queue.pop()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_capacity_rejects_without_blocking() {
        let queue = ActionQueue::new(2);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        assert_eq!(queue.try_push(3), Err(3));
        queue.force_push(4);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(), vec![1, 2, 4]);
    }

    #[test]
    fn test_pop_waits_for_push() {
        let queue = Arc::new(ActionQueue::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        queue.try_push("late").unwrap();
        assert_eq!(consumer.join().unwrap(), "late");
    }
}
