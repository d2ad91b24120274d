//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;

use axum::Router;
use axum::routing::{get, post, put};

use porchlight_app::ports::{DeviceRegistry, DeviceTransport, ScheduleRepository};

use crate::state::AppState;

/// Build the API routes.
///
/// Paths sit at the root so the dashboard script can call them as-is.
pub fn routes<G, T, R>() -> Router<AppState<G, T, R>>
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Router::new()
        // Devices
        .route("/devices", get(devices::list::<G, T, R>))
        .route("/on/{address}", post(devices::turn_on::<G, T, R>))
        .route("/off/{address}", post(devices::turn_off::<G, T, R>))
        .route("/on_all", post(devices::turn_on_all::<G, T, R>))
        .route("/off_all", post(devices::turn_off_all::<G, T, R>))
        // Schedules
        .route(
            "/schedules",
            get(schedules::list::<G, T, R>).post(schedules::create::<G, T, R>),
        )
        .route(
            "/schedules/{id}",
            get(schedules::get::<G, T, R>).delete(schedules::delete::<G, T, R>),
        )
        .route("/schedules/{id}/toggle", put(schedules::toggle::<G, T, R>))
}
