use std::sync::atomic::{AtomicU64, Ordering};

use crate::line::{LatLong, LineLayer, PolylineLayer};
use crate::symbology::LineStyle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl LayerId {
    /// Process-wide unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// The two kinds of layer a route segment can own.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLayer {
    /// Straight placeholder drawn while the route is computed.
    Beeline(LineLayer),
    /// Final geometry from the routing backend.
    Polyline(PolylineLayer),
}

impl RouteLayer {
    pub fn is_beeline(&self) -> bool {
        matches!(self, RouteLayer::Beeline(_))
    }

    pub fn points(&self) -> &[LatLong] {
        match self {
            RouteLayer::Beeline(line) => line.points(),
            RouteLayer::Polyline(polyline) => polyline.points(),
        }
    }

    pub fn style(&self) -> &LineStyle {
        match self {
            RouteLayer::Beeline(line) => &line.style,
            RouteLayer::Polyline(polyline) => &polyline.style,
        }
    }
}

impl Layer for RouteLayer {
    fn id(&self) -> LayerId {
        match self {
            RouteLayer::Beeline(line) => line.id(),
            RouteLayer::Polyline(polyline) => polyline.id(),
        }
    }
}

impl From<LineLayer> for RouteLayer {
    fn from(line: LineLayer) -> Self {
        RouteLayer::Beeline(line)
    }
}

impl From<PolylineLayer> for RouteLayer {
    fn from(polyline: PolylineLayer) -> Self {
        RouteLayer::Polyline(polyline)
    }
}

#[cfg(test)]
mod tests {
    use super::LayerId;

    #[test]
    fn ids_are_unique() {
        let a = LayerId::next();
        let b = LayerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
