/// A unit of work executed by the [`Worker`](crate::worker::Worker).
///
/// Exactly one of `run` or `discard` is called for every submitted job.
pub trait Job: Send + 'static {
    /// Short label for log output.
    fn name(&self) -> &str {
        "job"
    }

    fn run(self: Box<Self>);

    /// Called instead of `run` when the job never got to execute, either
    /// because a newer job took its place in the mailbox or because the worker
    /// shut down first.
    fn discard(self: Box<Self>);
}

/// Adapter turning a pair of closures into a [`Job`].
pub struct FnJob<R, D> {
    name: &'static str,
    run: R,
    discard: D,
}

impl<R, D> FnJob<R, D>
where
    R: FnOnce() + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    pub fn new(name: &'static str, run: R, discard: D) -> Self {
        Self { name, run, discard }
    }
}

impl<R, D> Job for FnJob<R, D>
where
    R: FnOnce() + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn run(self: Box<Self>) {
        (self.run)()
    }

    fn discard(self: Box<Self>) {
        (self.discard)()
    }
}
