use foundation::{DistanceAndTime, Position};

/// Outcome class of a single routing query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Validity {
    Valid,
    Invalid,
    /// One of the endpoints could not be matched against the loaded data.
    PointNotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingResult {
    validity: Validity,
    positions: Vec<Position>,
    distance_and_time: Option<DistanceAndTime>,
}

impl RoutingResult {
    /// A computed route. `positions` are the intermediate points, without the
    /// two endpoints.
    pub fn valid(positions: Vec<Position>, distance_and_time: Option<DistanceAndTime>) -> Self {
        Self {
            validity: Validity::Valid,
            positions,
            distance_and_time,
        }
    }

    pub fn invalid() -> Self {
        Self {
            validity: Validity::Invalid,
            positions: Vec::new(),
            distance_and_time: None,
        }
    }

    pub fn point_not_found() -> Self {
        Self {
            validity: Validity::PointNotFound,
            positions: Vec::new(),
            distance_and_time: None,
        }
    }

    pub fn with_distance_and_time(mut self, distance_and_time: DistanceAndTime) -> Self {
        self.distance_and_time = Some(distance_and_time);
        self
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    /// Intermediate points; only meaningful for [`Validity::Valid`].
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn distance_and_time(&self) -> Option<DistanceAndTime> {
        self.distance_and_time
    }
}

#[cfg(test)]
mod tests {
    use foundation::{DistanceAndTime, Position};

    use super::{RoutingResult, Validity};

    #[test]
    fn constructors_set_validity() {
        assert!(RoutingResult::valid(vec![Position::new(1.0, 2.0)], None).is_valid());
        assert_eq!(RoutingResult::invalid().validity(), Validity::Invalid);
        assert_eq!(
            RoutingResult::point_not_found().validity(),
            Validity::PointNotFound
        );
        assert!(RoutingResult::point_not_found().positions().is_empty());
    }

    #[test]
    fn distance_and_time_is_optional() {
        let dt = DistanceAndTime::new(Some(1200.0), Some(90));
        let result = RoutingResult::invalid().with_distance_and_time(dt);
        assert_eq!(result.distance_and_time(), Some(dt));
        assert_eq!(RoutingResult::invalid().distance_and_time(), None);
    }
}
