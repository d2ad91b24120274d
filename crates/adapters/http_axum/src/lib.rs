//! # porchlight-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API the dashboard script talks to:
//!   `/on/{address}`, `/off/{address}`, `/on_all`, `/off_all`, `/devices`,
//!   and `/schedules` CRUD
//! - Serve the static dashboard assets from a configured directory
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `porchlight-app` (for port traits and services) and `porchlight-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
