//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod registry;
pub mod schedule_repo;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use registry::DeviceRegistry;
pub use schedule_repo::ScheduleRepository;
pub use transport::{DeviceTransport, TransportError};
