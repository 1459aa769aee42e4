use std::sync::Arc;

use foundation::{DistanceAndTime, Position};
use layers::{Layer, LayerId, MapSurface, RouteLayer};
use parking_lot::Mutex;
use routing::Validity;

#[derive(Debug, Default)]
struct SegmentState {
    layer: Option<LayerId>,
    distance_and_time: Option<DistanceAndTime>,
    validity: Option<Validity>,
}

/// One consecutive pair of route waypoints and what is drawn for it.
///
/// The endpoints never change. The layer and the distance/time are written
/// by the rendering engine only; callers read them.
#[derive(Debug)]
pub struct RouteSegment {
    first: Position,
    second: Position,
    state: Mutex<SegmentState>,
}

impl RouteSegment {
    pub fn new(first: Position, second: Position) -> Self {
        Self {
            first,
            second,
            state: Mutex::new(SegmentState::default()),
        }
    }

    /// Segments for every consecutive pair of `positions`.
    pub fn pairs(positions: &[Position]) -> Vec<Arc<RouteSegment>> {
        positions
            .windows(2)
            .map(|pair| Arc::new(RouteSegment::new(pair[0], pair[1])))
            .collect()
    }

    pub fn first(&self) -> &Position {
        &self.first
    }

    pub fn second(&self) -> &Position {
        &self.second
    }

    pub fn has_coordinates(&self) -> bool {
        self.first.has_coordinates() && self.second.has_coordinates()
    }

    /// The layer currently owned by this segment, if any.
    pub fn layer(&self) -> Option<LayerId> {
        self.state.lock().layer
    }

    pub fn distance_and_time(&self) -> Option<DistanceAndTime> {
        self.state.lock().distance_and_time
    }

    /// Outcome of the last routing query drawn for this segment. `None` while
    /// only the beeline is known.
    pub fn validity(&self) -> Option<Validity> {
        self.state.lock().validity
    }

    /// Record a straight-line estimate; forgets any earlier routing outcome.
    pub(crate) fn set_beeline(&self, distance_and_time: DistanceAndTime) {
        let mut state = self.state.lock();
        state.distance_and_time = Some(distance_and_time);
        state.validity = None;
    }

    pub(crate) fn set_routed(
        &self,
        validity: Validity,
        distance_and_time: Option<DistanceAndTime>,
    ) {
        let mut state = self.state.lock();
        state.distance_and_time = distance_and_time;
        state.validity = Some(validity);
    }

    /// Put `layer` on the map in place of whatever this segment showed before.
    ///
    /// The previous layer leaves the map before the new one is added, so the
    /// segment never has two layers visible at once.
    pub(crate) fn replace_layer(&self, surface: &dyn MapSurface, layer: RouteLayer) {
        self.clear(surface);
        self.state.lock().layer = Some(layer.id());
        surface.add_layer(layer);
    }

    /// Remove this segment's layer from the map. Returns the removed id.
    pub fn clear(&self, surface: &dyn MapSurface) -> Option<LayerId> {
        let previous = self.state.lock().layer.take();
        if let Some(id) = previous {
            surface.remove_layer(id);
        }
        previous
    }
}

/// Totals over all segments of a route.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RouteSummary {
    pub segments: usize,
    /// Segments that currently own a layer.
    pub rendered: usize,
    pub distance_m: f64,
    /// `None` unless at least one segment knows its duration.
    pub time_s: Option<i64>,
}

impl RouteSummary {
    pub fn of(segments: &[Arc<RouteSegment>]) -> Self {
        let mut summary = RouteSummary {
            segments: segments.len(),
            ..RouteSummary::default()
        };
        for segment in segments {
            let state = segment.state.lock();
            if state.layer.is_some() {
                summary.rendered += 1;
            }
            let Some(dt) = state.distance_and_time else {
                continue;
            };
            summary.distance_m += dt.distance_m.unwrap_or(0.0);
            if let Some(time_s) = dt.time_s {
                summary.time_s = Some(summary.time_s.unwrap_or(0) + time_s);
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use foundation::{DistanceAndTime, Position};
    use layers::{LatLong, LayerStack, LineLayer, LineStyle, MapSurface, PolylineLayer};
    use pretty_assertions::assert_eq;
    use routing::Validity;

    use super::{RouteSegment, RouteSummary};

    fn line() -> LineLayer {
        LineLayer::new(
            LatLong::new(0.0, 0.0),
            LatLong::new(1.0, 1.0),
            LineStyle::downloading(4),
            256,
        )
    }

    #[test]
    fn pairs_builds_consecutive_segments() {
        let a = Position::new(1.0, 1.0);
        let b = Position::new(2.0, 2.0);
        let c = Position::new(3.0, 3.0);
        let segments = RouteSegment::pairs(&[a, b, c]);
        assert_eq!(segments.len(), 2);
        assert_eq!(*segments[0].first(), a);
        assert_eq!(*segments[0].second(), b);
        assert_eq!(*segments[1].first(), b);
        assert_eq!(*segments[1].second(), c);

        assert!(RouteSegment::pairs(&[a]).is_empty());
    }

    #[test]
    fn has_coordinates_needs_both_ends() {
        let with = RouteSegment::new(Position::new(1.0, 1.0), Position::new(2.0, 2.0));
        let without = RouteSegment::new(Position::new(1.0, 1.0), Position::unresolved());
        assert!(with.has_coordinates());
        assert!(!without.has_coordinates());
    }

    #[test]
    fn replace_layer_removes_previous_first() {
        let stack = LayerStack::new(256);
        let segment = RouteSegment::new(Position::new(1.0, 1.0), Position::new(2.0, 2.0));

        let beeline = line();
        segment.replace_layer(&stack, beeline.clone().into());
        let polyline = PolylineLayer::new(
            vec![LatLong::new(0.0, 0.0), LatLong::new(1.0, 1.0)],
            LineStyle::default(),
            256,
        );
        let polyline_id = layers::Layer::id(&polyline);
        segment.replace_layer(&stack, polyline.into());

        assert_eq!(stack.len(), 1);
        assert_eq!(segment.layer(), Some(polyline_id));
        assert_eq!(
            stack.journal(),
            vec![
                layers::LayerEvent::Added {
                    id: layers::Layer::id(&beeline),
                    beeline: true
                },
                layers::LayerEvent::Removed {
                    id: layers::Layer::id(&beeline)
                },
                layers::LayerEvent::Added {
                    id: polyline_id,
                    beeline: false
                },
            ]
        );
    }

    #[test]
    fn clear_removes_layer() {
        let stack = LayerStack::new(256);
        let segment = RouteSegment::new(Position::new(1.0, 1.0), Position::new(2.0, 2.0));
        segment.replace_layer(&stack, line().into());
        assert!(segment.clear(&stack).is_some());
        assert_eq!(segment.layer(), None);
        assert!(stack.is_empty());
        assert_eq!(segment.clear(&stack), None);
        assert_eq!(stack.tile_size(), 256);
    }

    #[test]
    fn summary_adds_up_known_values() {
        let segments = RouteSegment::pairs(&[
            Position::new(1.0, 1.0),
            Position::new(2.0, 2.0),
            Position::new(3.0, 3.0),
            Position::new(4.0, 4.0),
        ]);
        segments[0].set_routed(
            Validity::Valid,
            Some(DistanceAndTime::new(Some(100.0), Some(10))),
        );
        segments[1].set_beeline(DistanceAndTime::new(Some(50.0), None));

        let summary = RouteSummary::of(&segments);
        assert_eq!(summary.segments, 3);
        assert_eq!(summary.rendered, 0);
        assert_eq!(summary.distance_m, 150.0);
        assert_eq!(summary.time_s, Some(10));
    }

    #[test]
    fn beeline_forgets_routing_outcome() {
        let segment = RouteSegment::new(Position::new(1.0, 1.0), Position::new(2.0, 2.0));
        assert_eq!(segment.validity(), None);

        segment.set_routed(Validity::PointNotFound, None);
        assert_eq!(segment.validity(), Some(Validity::PointNotFound));
        assert_eq!(segment.distance_and_time(), None);

        segment.set_beeline(DistanceAndTime::new(Some(10.0), None));
        assert_eq!(segment.validity(), None);
        assert_eq!(
            segment.distance_and_time(),
            Some(DistanceAndTime::new(Some(10.0), None))
        );
    }
}
