use crate::layer::{Layer, LayerId};
use crate::symbology::LineStyle;

/// Map coordinate in degrees, as handed to the map widget.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLong {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLong {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single straight line between two map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    id: LayerId,
    points: [LatLong; 2],
    pub style: LineStyle,
    pub tile_size: u32,
}

impl LineLayer {
    pub fn new(from: LatLong, to: LatLong, style: LineStyle, tile_size: u32) -> Self {
        Self {
            id: LayerId::next(),
            points: [from, to],
            style,
            tile_size,
        }
    }

    pub fn start(&self) -> LatLong {
        self.points[0]
    }

    pub fn end(&self) -> LatLong {
        self.points[1]
    }

    pub fn points(&self) -> &[LatLong] {
        &self.points
    }
}

impl Layer for LineLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

/// An open path through an ordered list of map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineLayer {
    id: LayerId,
    points: Vec<LatLong>,
    pub style: LineStyle,
    pub tile_size: u32,
}

impl PolylineLayer {
    pub fn new(points: Vec<LatLong>, style: LineStyle, tile_size: u32) -> Self {
        Self {
            id: LayerId::next(),
            points,
            style,
            tile_size,
        }
    }

    pub fn points(&self) -> &[LatLong] {
        &self.points
    }
}

impl Layer for PolylineLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLong, LineLayer, PolylineLayer};
    use crate::layer::Layer;
    use crate::symbology::LineStyle;

    #[test]
    fn line_keeps_endpoints_in_order() {
        let a = LatLong::new(53.0, 10.0);
        let b = LatLong::new(52.5, 13.4);
        let line = LineLayer::new(a, b, LineStyle::downloading(4), 256);
        assert_eq!(line.start(), a);
        assert_eq!(line.end(), b);
        assert_eq!(line.points(), &[a, b]);
    }

    #[test]
    fn every_layer_gets_its_own_id() {
        let points = vec![LatLong::new(0.0, 0.0), LatLong::new(1.0, 1.0)];
        let a = PolylineLayer::new(points.clone(), LineStyle::default(), 256);
        let b = PolylineLayer::new(points, LineStyle::default(), 256);
        assert_ne!(a.id(), b.id());
    }
}
