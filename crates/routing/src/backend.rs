use std::fmt;
use std::str::FromStr;

use foundation::{LongitudeAndLatitude, Position};
use runtime::CancellationToken;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::download::DownloadHandle;
use crate::error::RoutingError;
use crate::result::RoutingResult;

/// Profile the backend routes for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Car,
    Bike,
    Foot,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Bike => "bike",
            TravelMode::Foot => "foot",
        }
    }

    /// Typical cruising speed, used to estimate durations.
    pub fn speed_m_per_s(&self) -> f64 {
        match self {
            TravelMode::Car => 50.0 / 3.6,
            TravelMode::Bike => 18.0 / 3.6,
            TravelMode::Foot => 5.0 / 3.6,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode: {0}")]
pub struct UnknownTravelMode(pub String);

impl FromStr for TravelMode {
    type Err = UnknownTravelMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(TravelMode::Car),
            "bike" => Ok(TravelMode::Bike),
            "foot" => Ok(TravelMode::Foot),
            other => Err(UnknownTravelMode(other.to_string())),
        }
    }
}

/// An external routing service.
///
/// Every potentially long call receives a [`CancellationToken`]. Backends that
/// can stop early should return [`RoutingError::Cancelled`] once it flips;
/// backends that cannot may ignore it.
pub trait RoutingBackend: Send + Sync {
    /// `false` while the service is still starting up (loading graphs, ...).
    fn is_initialized(&self) -> bool;

    /// `true` if routing data has to be downloaded before routes can be
    /// computed.
    fn is_download_mode(&self) -> bool;

    fn route_between(
        &self,
        from: &Position,
        to: &Position,
        travel_mode: TravelMode,
        token: &CancellationToken,
    ) -> Result<RoutingResult, RoutingError>;

    /// Prepare routing data covering `points`.
    ///
    /// `Ok(None)` means nothing has to be downloaded.
    fn download_data_for(
        &self,
        points: &[LongitudeAndLatitude],
        token: &CancellationToken,
    ) -> Result<Option<Box<dyn DownloadHandle>>, RoutingError>;
}
