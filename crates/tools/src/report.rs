use std::sync::Arc;

use layers::{LayerStack, RouteLayer};
use renderer::{RouteSegment, RouteSummary};
use routing::Validity;
use serde::Serialize;

/// What a segment ended up showing on the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Drawn {
    Nothing,
    Beeline,
    Route,
    Invalid,
}

impl Drawn {
    /// Classified by the recorded routing outcome; paints are configurable.
    fn of(layer: Option<&RouteLayer>, validity: Option<Validity>) -> Self {
        match (layer, validity) {
            (None, _) => Drawn::Nothing,
            (Some(layer), _) if layer.is_beeline() => Drawn::Beeline,
            (Some(_), Some(Validity::Valid)) => Drawn::Route,
            (Some(_), _) => Drawn::Invalid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentReport {
    pub index: usize,
    pub drawn: Drawn,
    pub points: usize,
    pub distance_m: Option<f64>,
    pub time_s: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub segments: Vec<SegmentReport>,
    pub total_distance_m: f64,
    pub total_time_s: Option<i64>,
}

impl RouteReport {
    pub fn collect(segments: &[Arc<RouteSegment>], stack: &LayerStack) -> Self {
        let reports = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let layer = segment.layer().and_then(|id| stack.layer(id));
                let dt = segment.distance_and_time().unwrap_or_default();
                SegmentReport {
                    index,
                    drawn: Drawn::of(layer.as_ref(), segment.validity()),
                    points: layer.as_ref().map_or(0, |l| l.points().len()),
                    distance_m: dt.distance_m,
                    time_s: dt.time_s,
                }
            })
            .collect();
        let summary = RouteSummary::of(segments);
        Self {
            segments: reports,
            total_distance_m: summary.distance_m,
            total_time_s: summary.time_s,
        }
    }

    /// Human readable table, one line per segment plus a total.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for s in &self.segments {
            out.push_str(&format!(
                "#{:<3} {:<8} {:>4} pts {:>10} {:>8}\n",
                s.index,
                format!("{:?}", s.drawn).to_lowercase(),
                s.points,
                format_distance(s.distance_m),
                format_time(s.time_s),
            ));
        }
        out.push_str(&format!(
            "total         {:>14} {:>8}\n",
            format_distance(Some(self.total_distance_m)),
            format_time(self.total_time_s),
        ));
        out
    }
}

fn format_distance(distance_m: Option<f64>) -> String {
    match distance_m {
        Some(m) if m >= 1000.0 => format!("{:.2} km", m / 1000.0),
        Some(m) => format!("{m:.0} m"),
        None => "-".to_string(),
    }
}

fn format_time(time_s: Option<i64>) -> String {
    match time_s {
        Some(s) => format!("{}:{:02}", s / 60, s % 60),
        None => "-".to_string(),
    }
}
