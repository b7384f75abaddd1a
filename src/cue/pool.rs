use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of worker threads fed from one channel.
///
/// At most `size` jobs run at once; the rest wait in the channel.
pub(crate) struct WorkerPool {
    name: String,
    tx: Mutex<Option<Sender<Job>>>,
    rx: Receiver<Job>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(name: &str, size: usize) -> std::io::Result<Self> {
        let (tx, rx) = flume::unbounded::<Job>();
        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let rx = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("{}-{}", name, i))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                })?;
            workers.push(handle);
        }
        log::debug!("{} pool started with {} workers", name, size);

        Ok(Self {
            name: name.to_string(),
            tx: Mutex::new(Some(tx)),
            rx,
            workers: Mutex::new(workers),
        })
    }

    /// False once the pool is shut down
    pub fn submit(&self, job: Job) -> bool {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match tx.as_ref() {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }

    /// Drop queued jobs, let running ones end and wait for workers until
    /// `deadline`. Workers still busy after that are detached. Returns how
    /// many were detached.
    pub fn shutdown(&self, deadline: Instant) -> usize {
        let dropped = self.rx.drain().count();
        if dropped > 0 {
            log::debug!("{} pool dropped {} queued jobs", self.name, dropped);
        }
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();

        let mut workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        while !workers.is_empty() && Instant::now() < deadline {
            let (finished, running): (Vec<_>, Vec<_>) =
                workers.into_iter().partition(|w| w.is_finished());
            for worker in finished {
                let _ = worker.join();
            }
            workers = running;
            if !workers.is_empty() {
                std::thread::sleep(Duration::from_millis(2));
            }
        }

        let detached = workers.into_iter().filter(|w| !w.is_finished()).count();
        if detached > 0 {
            log::warn!("{} pool: {} workers still busy at shutdown, detaching", self.name, detached);
        }
        detached
    }
}
