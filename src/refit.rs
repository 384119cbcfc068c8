// Background refit worker
// A single thread drains a FIFO queue of population refits so batch clustering
// never runs on a caller's request path.

use crate::engine::Engine;
use cohort_cluster::ClusterAssignment;
use cohort_core::{Result, UserProfile};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Receives the outcome of one queued refit
pub type RefitTicket = mpsc::Receiver<Result<Vec<ClusterAssignment>>>;

struct RefitJob {
    profiles: Vec<UserProfile>,
    reply: mpsc::Sender<Result<Vec<ClusterAssignment>>>,
}

struct Queue {
    jobs: Mutex<VecDeque<RefitJob>>,
    condvar: Condvar,
    running: AtomicBool,
    completed: AtomicU64,
}

/// Owns the refit thread for one engine
pub struct RefitWorker {
    queue: Arc<Queue>,
    handle: Option<JoinHandle<()>>,
}

impl RefitWorker {
    /// Start the worker thread
    pub fn spawn(engine: Arc<Engine>) -> std::io::Result<Self> {
        let queue = Arc::new(Queue {
            jobs: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            running: AtomicBool::new(true),
            completed: AtomicU64::new(0),
        });

        let worker_queue = queue.clone();
        let handle = thread::Builder::new()
            .name("cohort-refit".to_string())
            .spawn(move || run(engine, worker_queue))?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Queue a refit over `profiles`; the ticket yields its assignments.
    pub fn submit(&self, profiles: Vec<UserProfile>) -> RefitTicket {
        let (reply, ticket) = mpsc::channel();
        let mut jobs = self.queue.jobs.lock();
        jobs.push_back(RefitJob { profiles, reply });
        self.queue.condvar.notify_one();
        ticket
    }

    pub fn pending_jobs(&self) -> usize {
        self.queue.jobs.lock().len()
    }

    pub fn jobs_completed(&self) -> u64 {
        self.queue.completed.load(Ordering::Relaxed)
    }

    /// Finish queued jobs, then stop the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.queue.running.store(false, Ordering::Release);
        self.queue.condvar.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Refit worker panicked");
            }
        }
    }
}

impl Drop for RefitWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(engine: Arc<Engine>, queue: Arc<Queue>) {
    debug!("Refit worker started");
    loop {
        let mut jobs = queue.jobs.lock();
        while jobs.is_empty() && queue.running.load(Ordering::Acquire) {
            queue.condvar.wait(&mut jobs);
        }
        let Some(job) = jobs.pop_front() else {
            // empty and no longer running
            break;
        };
        drop(jobs);

        let population = job.profiles.len();
        let result = engine.fit_population(&job.profiles);
        match &result {
            Ok(_) => info!(population, "Background refit finished"),
            Err(e) => error!(population, "Background refit failed: {}", e),
        }
        queue.completed.fetch_add(1, Ordering::Relaxed);
        // caller may have dropped the ticket
        let _ = job.reply.send(result);
    }
    debug!("Refit worker stopped");
}
