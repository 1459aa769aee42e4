use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use foundation::{DistanceAndTime, LongitudeAndLatitude, Position};
use routing::{DownloadHandle, RoutingBackend, RoutingError, RoutingResult, TravelMode};
use runtime::CancellationToken;
use tracing::debug;

/// Knobs for [`SimulatedBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    /// How long after construction the backend reports itself initialized.
    pub init_delay: Duration,
    /// Number of route queries answered with "point not found" before the
    /// backend starts finding points.
    pub point_not_found: usize,
    /// `Some(n)` puts the backend in download mode with `n` alternative
    /// datasets after the first one.
    pub alternatives: Option<usize>,
    /// Points interpolated between the two endpoints of every route.
    pub intermediate_points: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            init_delay: Duration::ZERO,
            point_not_found: 0,
            alternatives: None,
            intermediate_points: 3,
        }
    }
}

/// A routing backend without a road graph.
///
/// Routes are straight lines with evenly spaced intermediate points; the
/// duration follows from the travel mode's typical speed.
#[derive(Debug)]
pub struct SimulatedBackend {
    simulation: Simulation,
    started: Instant,
    point_not_found_left: AtomicUsize,
    route_queries: AtomicUsize,
}

impl SimulatedBackend {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            point_not_found_left: AtomicUsize::new(simulation.point_not_found),
            simulation,
            started: Instant::now(),
            route_queries: AtomicUsize::new(0),
        }
    }

    pub fn route_queries(&self) -> usize {
        self.route_queries.load(Ordering::SeqCst)
    }

    fn take_point_not_found(&self) -> bool {
        self.point_not_found_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl RoutingBackend for SimulatedBackend {
    fn is_initialized(&self) -> bool {
        self.started.elapsed() >= self.simulation.init_delay
    }

    fn is_download_mode(&self) -> bool {
        self.simulation.alternatives.is_some()
    }

    fn route_between(
        &self,
        from: &Position,
        to: &Position,
        travel_mode: TravelMode,
        token: &CancellationToken,
    ) -> Result<RoutingResult, RoutingError> {
        if token.is_cancelled() {
            return Err(RoutingError::Cancelled);
        }
        self.route_queries.fetch_add(1, Ordering::SeqCst);

        let (Some(start), Some(end)) = (from.longitude_and_latitude(), to.longitude_and_latitude())
        else {
            return Ok(RoutingResult::invalid());
        };
        if self.take_point_not_found() {
            debug!("simulating point not found");
            return Ok(RoutingResult::point_not_found());
        }

        let steps = self.simulation.intermediate_points + 1;
        let positions: Vec<Position> = (1..steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                Position::new(
                    start.longitude + (end.longitude - start.longitude) * t,
                    start.latitude + (end.latitude - start.latitude) * t,
                )
            })
            .collect();

        let mut distance = 0.0;
        let mut previous = *from;
        for position in positions.iter().chain(std::iter::once(to)) {
            distance += previous.calculate_distance(position).unwrap_or(0.0);
            previous = *position;
        }
        let time_s = (distance / travel_mode.speed_m_per_s()).round() as i64;

        Ok(RoutingResult::valid(
            positions,
            Some(DistanceAndTime::new(Some(distance), Some(time_s))),
        ))
    }

    fn download_data_for(
        &self,
        points: &[LongitudeAndLatitude],
        token: &CancellationToken,
    ) -> Result<Option<Box<dyn DownloadHandle>>, RoutingError> {
        let Some(alternatives) = self.simulation.alternatives else {
            return Ok(None);
        };
        if token.is_cancelled() {
            return Err(RoutingError::Cancelled);
        }
        debug!("simulated download covering {} points", points.len());
        Ok(Some(Box::new(SimulatedDownload::new(alternatives))))
    }
}

/// Download handle whose datasets need one download and one processing step
/// each.
#[derive(Debug)]
pub struct SimulatedDownload {
    dataset: usize,
    alternatives_left: usize,
    downloaded: bool,
    processed: bool,
}

impl SimulatedDownload {
    pub fn new(alternatives: usize) -> Self {
        Self {
            dataset: 0,
            alternatives_left: alternatives,
            downloaded: false,
            processed: false,
        }
    }

    pub fn dataset(&self) -> usize {
        self.dataset
    }
}

impl DownloadHandle for SimulatedDownload {
    fn requires_download(&self) -> bool {
        !self.downloaded
    }

    fn download(&mut self, token: &CancellationToken) -> Result<(), RoutingError> {
        if token.is_cancelled() {
            return Err(RoutingError::Cancelled);
        }
        debug!("downloading dataset {}", self.dataset);
        self.downloaded = true;
        Ok(())
    }

    fn requires_processing(&self) -> bool {
        self.downloaded && !self.processed
    }

    fn process(&mut self, token: &CancellationToken) -> Result<(), RoutingError> {
        if token.is_cancelled() {
            return Err(RoutingError::Cancelled);
        }
        debug!("processing dataset {}", self.dataset);
        self.processed = true;
        Ok(())
    }

    fn has_next_alternative(&self) -> bool {
        self.alternatives_left > 0
    }

    fn advance_to_next_alternative(&mut self) {
        self.alternatives_left = self.alternatives_left.saturating_sub(1);
        self.dataset += 1;
        self.downloaded = false;
        self.processed = false;
    }
}
