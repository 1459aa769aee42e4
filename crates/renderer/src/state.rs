use std::sync::Arc;
use std::time::Duration;

use runtime::{CancellationToken, Generation, GenerationCell};

/// Where the active request currently is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RenderPhase {
    #[default]
    Idle,
    RenderingBeeline,
    WaitingForBackend,
    RenderingRoute,
}

#[derive(Debug, Default)]
struct RenderStatus {
    phase: RenderPhase,
    /// Generation currently drawing beelines.
    beeline: Option<Generation>,
}

impl RenderStatus {
    fn reset(&mut self) {
        self.phase = RenderPhase::Idle;
        self.beeline = None;
    }
}

/// Point-in-time view of a [`RenderState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub phase: RenderPhase,
    pub in_progress: bool,
    pub beeline_in_progress: bool,
    pub generation: Option<Generation>,
}

/// Shared control state of the rendering engine.
///
/// A request is in progress exactly while its generation is the active one.
/// Phase and beeline flag sit under the same lock, so a superseded request
/// can never write them.
#[derive(Clone, Debug)]
pub struct RenderState {
    cell: Arc<GenerationCell<RenderStatus>>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(GenerationCell::new(RenderStatus::default())),
        }
    }

    /// Accept a new request, superseding the active one.
    pub fn begin(&self) -> Generation {
        self.cell.begin_with(RenderStatus::reset)
    }

    /// End whatever request is active. Idempotent.
    pub fn cancel(&self) -> Option<Generation> {
        self.cell.cancel_with(RenderStatus::reset)
    }

    /// Mark `generation` done if it is still the active one.
    pub fn finish(&self, generation: Generation) -> bool {
        self.cell.finish_with(generation, RenderStatus::reset)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.cell.is_active(generation)
    }

    /// Move `generation` to `phase`. Returns `false` if it was superseded.
    pub fn enter(&self, generation: Generation, phase: RenderPhase) -> bool {
        self.cell
            .update(generation, |status| status.phase = phase)
            .is_some()
    }

    /// Raise the beeline flag for `generation`.
    ///
    /// The flag drops together with the returned guard, also when drawing
    /// fails or panics. `None` if the generation was superseded.
    pub fn begin_beelines(&self, generation: Generation) -> Option<BeelineGuard> {
        self.cell.update(generation, |status| {
            status.phase = RenderPhase::RenderingBeeline;
            status.beeline = Some(generation);
        })?;
        Some(BeelineGuard {
            cell: Arc::clone(&self.cell),
            generation,
        })
    }

    /// Block until no beelines are being drawn.
    ///
    /// Returns `false` if `generation` stopped being active meanwhile.
    pub fn wait_for_beelines(&self, generation: Generation) -> bool {
        self.cell
            .wait_while(generation, |status| status.beeline.is_some())
    }

    /// Sleep up to `timeout`. Returns `true` if `generation` was cancelled or
    /// superseded, which also cuts the sleep short.
    pub fn wait_cancelled_for(&self, generation: Generation, timeout: Duration) -> bool {
        self.cell.wait_cancelled_for(generation, timeout)
    }

    pub fn token(&self, generation: Generation) -> CancellationToken {
        self.cell.token(generation)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.cell.read(|active, status| RenderSnapshot {
            phase: status.phase,
            in_progress: active.is_some(),
            beeline_in_progress: active.is_some() && status.beeline == active,
            generation: active,
        })
    }
}

/// Clears the beeline flag on drop.
#[derive(Debug)]
#[must_use = "the beeline flag is cleared when the guard drops"]
pub struct BeelineGuard {
    cell: Arc<GenerationCell<RenderStatus>>,
    generation: Generation,
}

impl Drop for BeelineGuard {
    fn drop(&mut self) {
        let generation = self.generation;
        self.cell.update_always(|status| {
            if status.beeline == Some(generation) {
                status.beeline = None;
            }
        });
    }
}
