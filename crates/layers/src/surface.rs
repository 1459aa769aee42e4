use foundation::Position;

use crate::layer::{LayerId, RouteLayer};
use crate::line::LatLong;

/// The map widget as seen by route rendering.
///
/// Implementations must be callable from a background thread; the widget is
/// responsible for marshalling onto its own UI thread if it needs to.
pub trait MapSurface: Send + Sync {
    fn add_layer(&self, layer: RouteLayer);

    /// Returns `false` if no layer with this id was on the map.
    fn remove_layer(&self, id: LayerId) -> bool;

    /// Map coordinate of `position`, `None` if it has no coordinates.
    fn project(&self, position: &Position) -> Option<LatLong> {
        let coordinates = position.longitude_and_latitude()?;
        Some(LatLong::new(coordinates.latitude, coordinates.longitude))
    }

    fn tile_size(&self) -> u32;
}
