use std::path::{Path, PathBuf};

use foundation::{Position, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteFileError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid route json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("a route needs at least two positions, got {0}")]
    TooShort(usize),
}

/// One waypoint as stored in a route file.
///
/// ```json
/// [{ "lon": 10.0, "lat": 53.5, "ele": 12.0, "time_ms": 0 }, { "lon": 10.1, "lat": 53.6 }]
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePoint {
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub ele: Option<f64>,
    #[serde(default)]
    pub time_ms: Option<i64>,
}

impl From<RoutePoint> for Position {
    fn from(point: RoutePoint) -> Self {
        Position {
            longitude: point.lon,
            latitude: point.lat,
            elevation: point.ele,
            time: point.time_ms.map(Timestamp::from_millis),
        }
    }
}

pub fn parse_route(json: &str) -> Result<Vec<Position>, RouteFileError> {
    let points: Vec<RoutePoint> = serde_json::from_str(json)?;
    if points.len() < 2 {
        return Err(RouteFileError::TooShort(points.len()));
    }
    Ok(points.into_iter().map(Position::from).collect())
}

pub fn load_route(path: impl AsRef<Path>) -> Result<Vec<Position>, RouteFileError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| RouteFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_route(&json)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use foundation::{Position, Timestamp};
    use pretty_assertions::assert_eq;

    use super::{RouteFileError, load_route, parse_route};

    #[test]
    fn missing_fields_stay_unset() {
        let route = parse_route(
            r#"[
                { "lon": 10.0, "lat": 53.5, "ele": 12.5, "time_ms": 1000 },
                { "lat": 53.6 },
                {}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            route[0],
            Position::new(10.0, 53.5)
                .with_elevation(12.5)
                .with_time(Timestamp::from_millis(1000))
        );
        assert!(!route[1].has_coordinates());
        assert_eq!(route[1].latitude, Some(53.6));
        assert_eq!(route[2], Position::unresolved());
    }

    #[test]
    fn single_point_is_rejected() {
        let err = parse_route(r#"[{ "lon": 1.0, "lat": 2.0 }]"#).unwrap_err();
        assert!(matches!(err, RouteFileError::TooShort(1)));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_route("{ not json").unwrap_err(),
            RouteFileError::Json(_)
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "lon": 1.0, "lat": 2.0 }}, {{ "lon": 3.0, "lat": 4.0 }}]"#).unwrap();
        let route = load_route(file.path()).unwrap();
        assert_eq!(route, vec![Position::new(1.0, 2.0), Position::new(3.0, 4.0)]);
    }
}
