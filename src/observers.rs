use tracing::{debug, info, warn};

use crate::events::StoreEvent;

/// Receives every change the store makes.
pub trait StoreObserver {
    fn on_change(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent),
{
    fn on_change(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Writes each event to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_change(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Loaded { origin, count } => {
                info!(?origin, count, "library loaded");
            }
            StoreEvent::PersistFailed { message } => {
                warn!(%message, "library changes are not saved");
            }
            StoreEvent::Purged => info!("saved library purged"),
            other => debug!(event = ?other, "library changed"),
        }
    }
}
