use std::sync::Arc;

use foundation::{DistanceAndTime, LongitudeAndLatitude};
use layers::{LatLong, LineLayer, MapSurface, PolylineLayer};
use routing::{RoutingBackend, RoutingResult, StagedDownload, Validity};
use runtime::{CancellationToken, Generation};
use tracing::{debug, warn};

use crate::config::{Paints, RendererConfig};
use crate::error::RenderError;
use crate::segment::RouteSegment;
use crate::state::{RenderPhase, RenderState};

/// How a pipeline run ended when it did not fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Flow {
    Completed,
    /// The generation was superseded or disposed at a checkpoint.
    Cancelled,
}

/// One request's trip through beelines, readiness, downloads and routes.
///
/// Every layer mutation is preceded by a check that `generation` is still the
/// active one.
pub(crate) struct Pipeline<'a> {
    pub surface: &'a dyn MapSurface,
    pub backend: &'a dyn RoutingBackend,
    pub config: &'a RendererConfig,
    pub state: &'a RenderState,
    pub generation: Generation,
}

impl Pipeline<'_> {
    pub fn run(&self, segments: &[Arc<RouteSegment>]) -> Result<Flow, RenderError> {
        let paints = self.config.paints();
        let token = self.state.token(self.generation);

        if !self.draw_beelines(segments, &paints) || !self.is_current() {
            return Ok(Flow::Cancelled);
        }
        if !self.wait_for_backend() || !self.is_current() {
            return Ok(Flow::Cancelled);
        }
        if !self.state.wait_for_beelines(self.generation) {
            return Ok(Flow::Cancelled);
        }
        if !self.state.enter(self.generation, RenderPhase::RenderingRoute) {
            return Ok(Flow::Cancelled);
        }

        let mut download = self.prepare_download(segments, &token)?;
        for segment in segments.iter().filter(|s| self.endpoints(s).is_some()) {
            let Some(result) = self.calculate_result(segment, &mut download, &token)? else {
                return Ok(Flow::Cancelled);
            };
            if !self.draw_route(segment, &result, &paints) {
                return Ok(Flow::Cancelled);
            }
        }
        Ok(Flow::Completed)
    }

    fn is_current(&self) -> bool {
        self.state.is_current(self.generation)
    }

    /// Returns `false` if the request was cancelled while drawing.
    fn draw_beelines(&self, segments: &[Arc<RouteSegment>], paints: &Paints) -> bool {
        let Some(_guard) = self.state.begin_beelines(self.generation) else {
            return false;
        };
        let tile_size = self.surface.tile_size();
        let mut drawn = 0usize;

        for segment in segments {
            if !self.is_current() {
                debug!("beelines cancelled after {drawn} segments");
                return false;
            }
            let Some((from, to)) = self.endpoints(segment) else {
                continue;
            };
            segment.set_beeline(DistanceAndTime::beeline(segment.first(), segment.second()));
            let line = LineLayer::new(from, to, paints.downloading, tile_size);
            segment.replace_layer(self.surface, line.into());
            drawn += 1;
        }
        debug!("drew {drawn} beelines");
        true
    }

    /// Poll the backend until it reports ready. `false` if cancelled first.
    fn wait_for_backend(&self) -> bool {
        if !self.state.enter(self.generation, RenderPhase::WaitingForBackend) {
            return false;
        }
        let interval = self.config.readiness_poll_interval();
        let mut announced = false;
        while !self.backend.is_initialized() {
            if !announced {
                debug!("waiting for routing backend to initialize");
                announced = true;
            }
            if self.state.wait_cancelled_for(self.generation, interval) {
                return false;
            }
        }
        true
    }

    fn prepare_download(
        &self,
        segments: &[Arc<RouteSegment>],
        token: &CancellationToken,
    ) -> Result<Option<StagedDownload>, RenderError> {
        if !self.backend.is_download_mode() {
            return Ok(None);
        }
        let points: Vec<LongitudeAndLatitude> = segments
            .iter()
            .filter(|s| s.has_coordinates())
            .flat_map(|s| {
                [
                    s.first().longitude_and_latitude(),
                    s.second().longitude_and_latitude(),
                ]
            })
            .flatten()
            .collect();

        let Some(handle) = self.backend.download_data_for(&points, token)? else {
            return Ok(None);
        };
        let mut download = StagedDownload::new(handle);
        let state = download.resolve(token)?;
        debug!(?state, "routing data for {} points", points.len());
        Ok(Some(download))
    }

    /// Route `segment`, moving through download alternatives while the backend
    /// cannot match an endpoint. `None` if the request was cancelled.
    fn calculate_result(
        &self,
        segment: &RouteSegment,
        download: &mut Option<StagedDownload>,
        token: &CancellationToken,
    ) -> Result<Option<RoutingResult>, RenderError> {
        loop {
            if let Some(download) = download.as_mut() {
                download.resolve(token)?;
            }
            if token.is_cancelled() {
                return Ok(None);
            }

            let result = self.backend.route_between(
                segment.first(),
                segment.second(),
                self.config.travel_mode,
                token,
            )?;

            if result.validity() == Validity::PointNotFound && self.backend.is_download_mode() {
                if let Some(download) = download.as_mut() {
                    if download.next_alternative() {
                        continue;
                    }
                    warn!(
                        "point not found after {} routing data alternatives",
                        download.alternatives_taken()
                    );
                }
            }
            return Ok(Some(result));
        }
    }

    /// Replace the segment's beeline with the computed route. `false` if the
    /// request was cancelled before the map was touched.
    fn draw_route(&self, segment: &RouteSegment, result: &RoutingResult, paints: &Paints) -> bool {
        let mut points: Vec<LatLong> = Vec::with_capacity(result.positions().len() + 2);
        points.extend(self.surface.project(segment.first()));
        if result.is_valid() {
            points.extend(result.positions().iter().filter_map(|p| self.surface.project(p)));
        }
        points.extend(self.surface.project(segment.second()));

        debug!(
            validity = ?result.validity(),
            points = points.len(),
            "segment routed"
        );
        let style = if result.is_valid() {
            paints.route
        } else {
            paints.not_valid
        };
        let polyline = PolylineLayer::new(points, style, self.surface.tile_size());

        // Last check before the map is touched. The state lock is not held
        // across map calls, so a request superseding this one right here still
        // lets this polyline land. The newer request only starts drawing once
        // this job returns and replaces the layer of any segment it shares.
        if !self.is_current() {
            return false;
        }
        segment.set_routed(result.validity(), result.distance_and_time());
        segment.replace_layer(self.surface, polyline.into());
        true
    }

    fn endpoints(&self, segment: &RouteSegment) -> Option<(LatLong, LatLong)> {
        if !segment.has_coordinates() {
            return None;
        }
        Some((
            self.surface.project(segment.first())?,
            self.surface.project(segment.second())?,
        ))
    }
}
