use crate::math::geodesic_distance;
use crate::time::Timestamp;

/// A bare longitude/latitude pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LongitudeAndLatitude {
    pub longitude: f64,
    pub latitude: f64,
}

impl LongitudeAndLatitude {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A waypoint as it comes out of a GPS file or route editor.
///
/// Every field is optional: positions without longitude/latitude exist (e.g.
/// a named stop that was never geocoded) and must be skipped by anything that
/// draws or routes.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Position {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub elevation: Option<f64>,
    pub time: Option<Timestamp>,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude: Some(longitude),
            latitude: Some(latitude),
            elevation: None,
            time: None,
        }
    }

    /// A position without coordinates.
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = Some(time);
        self
    }

    pub fn has_coordinates(&self) -> bool {
        self.longitude_and_latitude().is_some()
    }

    pub fn longitude_and_latitude(&self) -> Option<LongitudeAndLatitude> {
        match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => {
                Some(LongitudeAndLatitude::new(longitude, latitude))
            }
            _ => None,
        }
    }

    /// Distance to `other` in meters, `None` if either side lacks coordinates.
    pub fn calculate_distance(&self, other: &Position) -> Option<f64> {
        let a = self.longitude_and_latitude()?;
        let b = other.longitude_and_latitude()?;
        Some(geodesic_distance(
            a.latitude,
            a.longitude,
            b.latitude,
            b.longitude,
        ))
    }

    /// Time between the two timestamps in milliseconds, `None` unless both
    /// positions carry a time.
    pub fn calculate_time(&self, other: &Position) -> Option<i64> {
        Some(self.time?.millis_until(other.time?))
    }
}

/// Distance in meters and duration in seconds of one route leg.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct DistanceAndTime {
    pub distance_m: Option<f64>,
    pub time_s: Option<i64>,
}

impl DistanceAndTime {
    pub fn new(distance_m: Option<f64>, time_s: Option<i64>) -> Self {
        Self { distance_m, time_s }
    }

    /// Straight-line estimate between two positions.
    pub fn beeline(first: &Position, second: &Position) -> Self {
        Self {
            distance_m: first.calculate_distance(second),
            time_s: first.calculate_time(second).map(|millis| millis / 1000),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distance_m.is_none() && self.time_s.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{DistanceAndTime, Position};
    use crate::time::Timestamp;

    #[test]
    fn coordinates_require_both_axes() {
        assert!(Position::new(10.0, 53.0).has_coordinates());
        assert!(!Position::unresolved().has_coordinates());

        let half = Position {
            longitude: Some(10.0),
            ..Position::default()
        };
        assert!(!half.has_coordinates());
        assert_eq!(half.calculate_distance(&Position::new(10.0, 53.0)), None);
    }

    #[test]
    fn time_needs_both_timestamps() {
        let a = Position::new(10.0, 53.0).with_time(Timestamp::from_millis(10_000));
        let b = Position::new(10.1, 53.0).with_time(Timestamp::from_millis(70_500));
        let c = Position::new(10.2, 53.0);

        assert_eq!(a.calculate_time(&b), Some(60_500));
        assert_eq!(a.calculate_time(&c), None);
    }

    #[test]
    fn beeline_converts_millis_to_seconds() {
        let a = Position::new(10.0, 53.0).with_time(Timestamp::from_millis(0));
        let b = Position::new(10.0, 53.01).with_time(Timestamp::from_millis(90_999));

        let dt = DistanceAndTime::beeline(&a, &b);
        assert_eq!(dt.time_s, Some(90));
        let d = dt.distance_m.unwrap();
        assert!((1_100.0..1_120.0).contains(&d), "unexpected distance {d}");
    }

    #[test]
    fn beeline_without_coordinates_is_empty() {
        let dt = DistanceAndTime::beeline(&Position::unresolved(), &Position::new(1.0, 1.0));
        assert!(dt.is_empty());
    }
}
