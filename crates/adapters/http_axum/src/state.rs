//! Shared application state for axum handlers.

use std::sync::Arc;

use porchlight_app::ports::{DeviceRegistry, DeviceTransport, ScheduleRepository};
use porchlight_app::services::dispatcher::CommandDispatcher;
use porchlight_app::services::schedule_service::ScheduleService;

/// Application state shared across all axum handlers.
///
/// Generic over the registry, transport and schedule repository to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<G, T, R> {
    /// Sends intents to devices.
    pub dispatcher: Arc<CommandDispatcher<G, T>>,
    /// Schedule CRUD service.
    pub schedule_service: Arc<ScheduleService<R>>,
}

impl<G, T, R> Clone for AppState<G, T, R> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            schedule_service: Arc::clone(&self.schedule_service),
        }
    }
}

impl<G, T, R> AppState<G, T, R>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(dispatcher: CommandDispatcher<G, T>, schedule_service: ScheduleService<R>) -> Self {
        Self::from_arcs(Arc::new(dispatcher), Arc::new(schedule_service))
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        dispatcher: Arc<CommandDispatcher<G, T>>,
        schedule_service: Arc<ScheduleService<R>>,
    ) -> Self {
        Self {
            dispatcher,
            schedule_service,
        }
    }
}
