use std::sync::Arc;

use parking_lot::Mutex;

use crate::layer::{Layer, LayerId, RouteLayer};
use crate::surface::MapSurface;

/// One mutation of a [`LayerStack`], in the order it happened.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerEvent {
    Added { id: LayerId, beeline: bool },
    Removed { id: LayerId },
}

impl LayerEvent {
    pub fn id(&self) -> LayerId {
        match self {
            LayerEvent::Added { id, .. } | LayerEvent::Removed { id } => *id,
        }
    }
}

type Observer = Arc<dyn Fn(&LayerEvent) + Send + Sync>;

#[derive(Default)]
struct StackInner {
    // Bottom to top.
    layers: Vec<RouteLayer>,
    journal: Vec<LayerEvent>,
}

/// In-memory [`MapSurface`]: an ordered layer list plus a journal of every
/// add/remove.
///
/// Used headless (CLI, tests) and as the model behind a real map widget.
pub struct LayerStack {
    tile_size: u32,
    inner: Mutex<StackInner>,
    observer: Mutex<Option<Observer>>,
}

impl LayerStack {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            inner: Mutex::new(StackInner::default()),
            observer: Mutex::new(None),
        }
    }

    /// Register a callback invoked after every mutation, outside the stack's
    /// lock.
    pub fn set_observer(&self, observer: impl Fn(&LayerEvent) + Send + Sync + 'static) {
        *self.observer.lock() = Some(Arc::new(observer));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.inner.lock().layers.iter().any(|l| l.id() == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<RouteLayer> {
        self.inner
            .lock()
            .layers
            .iter()
            .find(|l| l.id() == id)
            .cloned()
    }

    /// Snapshot of all layers, bottom to top.
    pub fn layers(&self) -> Vec<RouteLayer> {
        self.inner.lock().layers.clone()
    }

    pub fn journal(&self) -> Vec<LayerEvent> {
        self.inner.lock().journal.clone()
    }

    fn notify(&self, event: LayerEvent) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer(&event);
        }
    }
}

impl MapSurface for LayerStack {
    fn add_layer(&self, layer: RouteLayer) {
        let event = {
            let mut inner = self.inner.lock();
            let id = layer.id();
            if inner.layers.iter().any(|l| l.id() == id) {
                return;
            }
            let event = LayerEvent::Added {
                id,
                beeline: layer.is_beeline(),
            };
            inner.layers.push(layer);
            inner.journal.push(event);
            event
        };
        self.notify(event);
    }

    fn remove_layer(&self, id: LayerId) -> bool {
        let event = {
            let mut inner = self.inner.lock();
            let Some(index) = inner.layers.iter().position(|l| l.id() == id) else {
                return false;
            };
            inner.layers.remove(index);
            let event = LayerEvent::Removed { id };
            inner.journal.push(event);
            event
        };
        self.notify(event);
        true
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }
}
