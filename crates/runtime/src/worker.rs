use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};

use crate::job::Job;

/// What happened to a job handed to [`Worker::submit`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The mailbox was empty; the job runs once the worker is free.
    Queued,
    /// A job that had not started yet was replaced (and discarded).
    Replaced,
    /// The worker is shutting down; the job was discarded.
    Rejected,
}

#[derive(Default)]
struct MailboxSlot {
    pending: Option<Box<dyn Job>>,
    busy: bool,
    shutdown: bool,
}

#[derive(Default)]
struct Mailbox {
    slot: Mutex<MailboxSlot>,
    changed: Condvar,
}

/// A single background thread with a one-slot mailbox.
///
/// At most one job executes at a time and at most one waits. Submitting while
/// a job is waiting replaces it: only the newest request is worth running.
/// The running job is never interrupted; it has to notice on its own that it
/// was superseded.
pub struct Worker {
    name: String,
    mailbox: Arc<Mailbox>,
    thread_id: ThreadId,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let mailbox = Arc::new(Mailbox::default());
        let thread = {
            let mailbox = Arc::clone(&mailbox);
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&mailbox))?
        };
        debug!("worker {name} started");
        Ok(Self {
            name,
            mailbox,
            thread_id: thread.thread().id(),
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn submit(&self, job: Box<dyn Job>) -> Submission {
        let (submission, dropped) = {
            let mut slot = self.mailbox.slot.lock();
            if slot.shutdown {
                (Submission::Rejected, Some(job))
            } else {
                match slot.pending.replace(job) {
                    Some(previous) => (Submission::Replaced, Some(previous)),
                    None => (Submission::Queued, None),
                }
            }
        };
        self.mailbox.changed.notify_all();

        // Discard outside the lock: the callback may do anything, including
        // submitting again.
        if let Some(dropped) = dropped {
            debug!("worker {}: discarding {}", self.name, dropped.name());
            dropped.discard();
        }
        submission
    }

    /// `true` while a job runs or waits in the mailbox.
    pub fn is_busy(&self) -> bool {
        let slot = self.mailbox.slot.lock();
        slot.busy || slot.pending.is_some()
    }

    /// Block until the mailbox is empty and no job runs.
    ///
    /// A job calling this on its own worker would wait for itself; that call
    /// returns immediately.
    pub fn wait_idle(&self) {
        if thread::current().id() == self.thread_id {
            debug!("worker {}: wait_idle called from its own job", self.name);
            return;
        }
        let mut slot = self.mailbox.slot.lock();
        while (slot.busy || slot.pending.is_some()) && !slot.shutdown {
            self.mailbox.changed.wait(&mut slot);
        }
    }

    /// Stop accepting work, discard the waiting job and join the thread.
    ///
    /// A job that is already running is allowed to finish.
    pub fn shutdown(&mut self) {
        let pending = {
            let mut slot = self.mailbox.slot.lock();
            slot.shutdown = true;
            slot.pending.take()
        };
        self.mailbox.changed.notify_all();
        if let Some(pending) = pending {
            pending.discard();
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("worker {} terminated abnormally", self.name);
            } else {
                debug!("worker {} stopped", self.name);
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(mailbox: &Mailbox) {
    loop {
        let job = {
            let mut slot = mailbox.slot.lock();
            loop {
                if slot.shutdown {
                    return;
                }
                if let Some(job) = slot.pending.take() {
                    slot.busy = true;
                    break job;
                }
                mailbox.changed.wait(&mut slot);
            }
        };

        let name = job.name().to_string();
        // A panicking job must not take the thread down with it.
        if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
            error!("job {name} panicked");
        }

        mailbox.slot.lock().busy = false;
        mailbox.changed.notify_all();
    }
}
