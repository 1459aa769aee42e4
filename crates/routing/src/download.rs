use runtime::CancellationToken;
use tracing::debug;

use crate::error::RoutingError;

/// A pending download of routing data, as handed out by a backend.
///
/// A handle may know several alternative datasets (e.g. neighbouring map
/// extracts). When a point cannot be matched against the current one, the next
/// alternative can be tried.
pub trait DownloadHandle: Send {
    fn requires_download(&self) -> bool;

    fn download(&mut self, token: &CancellationToken) -> Result<(), RoutingError>;

    /// `true` if downloaded data still has to be prepared (unpacked, indexed).
    fn requires_processing(&self) -> bool;

    fn process(&mut self, token: &CancellationToken) -> Result<(), RoutingError>;

    fn has_next_alternative(&self) -> bool;

    fn advance_to_next_alternative(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DownloadState {
    NeedsDownload,
    NeedsProcessing,
    Ready,
    /// Every alternative was tried; nothing left to download.
    Exhausted,
}

/// Drives a [`DownloadHandle`] through its states.
///
/// `NeedsDownload -> NeedsProcessing -> Ready`, with `next_alternative`
/// jumping back to whatever the next dataset needs, or to `Exhausted`.
pub struct StagedDownload {
    handle: Box<dyn DownloadHandle>,
    exhausted: bool,
    alternatives_taken: usize,
}

impl StagedDownload {
    pub fn new(handle: Box<dyn DownloadHandle>) -> Self {
        Self {
            handle,
            exhausted: false,
            alternatives_taken: 0,
        }
    }

    pub fn state(&self) -> DownloadState {
        if self.exhausted {
            DownloadState::Exhausted
        } else if self.handle.requires_download() {
            DownloadState::NeedsDownload
        } else if self.handle.requires_processing() {
            DownloadState::NeedsProcessing
        } else {
            DownloadState::Ready
        }
    }

    /// Perform one transition and return the new state.
    ///
    /// `Ready` and `Exhausted` are terminal and returned unchanged.
    pub fn advance(&mut self, token: &CancellationToken) -> Result<DownloadState, RoutingError> {
        match self.state() {
            DownloadState::NeedsDownload => {
                if token.is_cancelled() {
                    return Err(RoutingError::Cancelled);
                }
                debug!("downloading routing data");
                self.handle.download(token)?;
            }
            DownloadState::NeedsProcessing => {
                if token.is_cancelled() {
                    return Err(RoutingError::Cancelled);
                }
                debug!("processing routing data");
                self.handle.process(token)?;
            }
            state @ (DownloadState::Ready | DownloadState::Exhausted) => return Ok(state),
        }
        Ok(self.state())
    }

    /// Advance until `Ready` or `Exhausted`.
    pub fn resolve(&mut self, token: &CancellationToken) -> Result<DownloadState, RoutingError> {
        let mut state = self.state();
        while matches!(
            state,
            DownloadState::NeedsDownload | DownloadState::NeedsProcessing
        ) {
            let next = self.advance(token)?;
            if next == state {
                // The handle claims success but still asks for the same step.
                return Err(match state {
                    DownloadState::NeedsDownload => {
                        RoutingError::Download("download did not complete".to_string())
                    }
                    _ => RoutingError::Processing("processing did not complete".to_string()),
                });
            }
            state = next;
        }
        Ok(state)
    }

    /// Switch to the next alternative dataset.
    ///
    /// Returns `false` and moves to `Exhausted` if there is none.
    pub fn next_alternative(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if !self.handle.has_next_alternative() {
            debug!(
                "no further routing data alternatives after {}",
                self.alternatives_taken
            );
            self.exhausted = true;
            return false;
        }
        self.handle.advance_to_next_alternative();
        self.alternatives_taken += 1;
        debug!("advanced to routing data alternative {}", self.alternatives_taken);
        true
    }

    pub fn alternatives_taken(&self) -> usize {
        self.alternatives_taken
    }
}

impl std::fmt::Debug for StagedDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedDownload")
            .field("state", &self.state())
            .field("alternatives_taken", &self.alternatives_taken)
            .finish()
    }
}
