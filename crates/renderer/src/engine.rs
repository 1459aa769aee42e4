use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use layers::MapSurface;
use routing::RoutingBackend;
use runtime::{Generation, Job, Submission, Worker};
use tracing::{debug, info, warn};

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::pipeline::{Flow, Pipeline};
use crate::segment::RouteSegment;
use crate::state::{RenderSnapshot, RenderState};

pub const WORKER_NAME: &str = "route-renderer";

/// How a render request ended. Delivered exactly once per request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    /// Every segment with coordinates got its final layer.
    Completed,
    /// Superseded by a newer request or disposed before finishing.
    Cancelled,
    /// A backend, download or map call failed; the error went to the
    /// routing-error callback.
    Failed,
}

type ErrorCallback = Arc<dyn Fn(&RenderError) + Send + Sync>;
type CompletionCallback = Box<dyn FnOnce(RenderOutcome) + Send>;

struct Shared {
    surface: Arc<dyn MapSurface>,
    backend: Arc<dyn RoutingBackend>,
    config: RendererConfig,
    state: RenderState,
    on_routing_error: ErrorCallback,
}

impl Shared {
    fn report(&self, error: &RenderError) {
        warn!("route rendering failed: {error}");
        (self.on_routing_error)(error);
    }
}

/// Draws route segments on a map, first as beelines, then as routes from a
/// routing backend.
///
/// All work happens on one background thread. Only the newest request is
/// worth finishing: [`RouteRenderingEngine::render`] supersedes whatever ran
/// before, and the superseded request stops at its next checkpoint.
pub struct RouteRenderingEngine {
    shared: Arc<Shared>,
    worker: Worker,
}

impl RouteRenderingEngine {
    pub fn new(
        surface: Arc<dyn MapSurface>,
        backend: Arc<dyn RoutingBackend>,
        config: RendererConfig,
        on_routing_error: impl Fn(&RenderError) + Send + Sync + 'static,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let worker = Worker::spawn(WORKER_NAME)?;
        Ok(Self {
            shared: Arc::new(Shared {
                surface,
                backend,
                config,
                state: RenderState::new(),
                on_routing_error: Arc::new(on_routing_error),
            }),
            worker,
        })
    }

    /// Render `segments`, superseding any request still in flight.
    ///
    /// Returns immediately. `on_complete` runs on the worker thread, or on
    /// the caller's thread if the request is replaced before it started.
    pub fn render(
        &self,
        segments: Vec<Arc<RouteSegment>>,
        on_complete: impl FnOnce(RenderOutcome) + Send + 'static,
    ) {
        let generation = self.shared.state.begin();
        info!(
            "render request {} with {} segments",
            generation.0,
            segments.len()
        );
        let job = RenderJob {
            shared: Arc::clone(&self.shared),
            generation,
            segments,
            on_complete: Box::new(on_complete),
        };
        match self.worker.submit(Box::new(job)) {
            Submission::Queued => {}
            Submission::Replaced => debug!("replaced pending render request"),
            Submission::Rejected => warn!("render worker is shut down"),
        }
    }

    /// Cancel the request in flight, if any. Idempotent.
    pub fn dispose(&self) {
        if let Some(generation) = self.shared.state.cancel() {
            info!("disposed render request {}", generation.0);
        }
    }

    pub fn state(&self) -> RenderSnapshot {
        self.shared.state.snapshot()
    }

    /// Block until the worker has nothing running or waiting.
    ///
    /// `on_complete` runs while the worker still counts as busy, so calling
    /// this from a completion callback returns at once instead of waiting.
    pub fn wait_idle(&self) {
        self.worker.wait_idle();
    }

    pub fn config(&self) -> &RendererConfig {
        &self.shared.config
    }
}

impl Drop for RouteRenderingEngine {
    fn drop(&mut self) {
        // Unblock a running request; the worker joins afterwards.
        self.shared.state.cancel();
    }
}

struct RenderJob {
    shared: Arc<Shared>,
    generation: Generation,
    segments: Vec<Arc<RouteSegment>>,
    on_complete: CompletionCallback,
}

impl Job for RenderJob {
    fn name(&self) -> &str {
        "render"
    }

    fn run(self: Box<Self>) {
        let RenderJob {
            shared,
            generation,
            segments,
            on_complete,
        } = *self;

        let pipeline = Pipeline {
            surface: shared.surface.as_ref(),
            backend: shared.backend.as_ref(),
            config: &shared.config,
            state: &shared.state,
            generation,
        };
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(&segments))) {
            Ok(Ok(Flow::Completed)) => RenderOutcome::Completed,
            Ok(Ok(Flow::Cancelled)) => RenderOutcome::Cancelled,
            // Only a superseded request turns a cancelled error into a cancellation.
            Ok(Err(err)) if err.is_cancellation() && !shared.state.is_current(generation) => {
                RenderOutcome::Cancelled
            }
            Ok(Err(err)) => {
                shared.report(&err);
                RenderOutcome::Failed
            }
            Err(payload) => {
                shared.report(&RenderError::from_panic(payload));
                RenderOutcome::Failed
            }
        };

        shared.state.finish(generation);
        info!("render request {} finished: {outcome:?}", generation.0);
        on_complete(outcome);
    }

    fn discard(self: Box<Self>) {
        debug!("render request {} never started", self.generation.0);
        (self.on_complete)(RenderOutcome::Cancelled);
    }
}
