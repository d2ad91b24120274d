//! # porchlight-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRegistry` — load the current device list
//!   - `DeviceTransport` — deliver one intent to one device over its wire protocol
//!   - `ScheduleRepository` — CRUD for schedules
//!   - `Clock` — local wall-clock time for the runner
//! - Define **driving/inbound** use-cases:
//!   - `CommandDispatcher` — retries, per-device hooks, fan-out to all devices
//!   - `ScheduleService` — validated schedule CRUD and trigger-set rebuilds
//!   - `ScheduleRunner` — once-per-second trigger evaluation
//!
//! ## Dependency rule
//! Depends on `porchlight-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod schedule_runner;
pub mod services;
