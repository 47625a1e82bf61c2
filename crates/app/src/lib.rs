#![deny(unsafe_code)]

/// Settings loading, normalization, and persistence.
pub mod config;
/// Line-oriented front-end standing in for the presentation layer.
pub mod console;
/// Orchestration of transcript, composition indicator, and reply timer.
pub mod coordinator;
/// Reply sources and the hard-coded assistant strings.
pub mod reply;
/// Quiet-period debouncing for raw resize events.
pub mod resize;
/// In-memory session provider.
pub mod session;

pub use config::{AppSettings, SettingsError, SettingsStore};
pub use coordinator::{ChatCoordinator, ChatEvent, CompositionOutcome};
pub use reply::{CANNED_REPLY, CannedReplies, ReplySource, SUGGESTED_PROMPTS};
pub use resize::ResizeDebouncer;
pub use session::InMemorySession;
