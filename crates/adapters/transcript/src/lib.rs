//! # porchlight-adapter-transcript
//!
//! Driving adapter for voice control. An external speech recogniser appends
//! text to a transcript file; this crate polls that file, recognises
//! `light on` / `light off`, dispatches the intent and clears the file.
//!
//! ## Dependency rule
//! Depends on `porchlight-app` (for the dispatcher) and `porchlight-domain`
//! (for intent detection).

mod target;
mod watcher;

pub use target::Target;
pub use watcher::TranscriptWatcher;
