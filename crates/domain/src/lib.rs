//! # porchlight-domain
//!
//! Pure domain model for the porchlight light controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, time-of-day values
//! - Define **Devices** (lights, servos, smart plugs) and their per-device hooks
//! - Define **Intents** (`on` / `off`) and their wire encodings per device kind
//! - Define **Schedules** (time-of-day triggers bound to an intent)
//! - Define **Fan-out reports** aggregating per-device dispatch outcomes
//! - Parse the flat device registry format and voice transcripts
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod dispatch;
pub mod intent;
pub mod registry;
pub mod schedule;
pub mod transcript;
