#![deny(unsafe_code)]

/// "Assistant is composing" state machine and reply tickets.
pub mod composer;
/// Unsent input text and submit/newline key mapping.
pub mod draft;
pub mod error;
pub mod message;
/// Conversation list and title filter.
pub mod roster;
/// Session context, navigation routes, and the auth route guard.
pub mod session;
/// Viewport, sidebar, and overlay state for the responsive shell.
pub mod shell;
/// Append-only message log for the active conversation.
pub mod transcript;

pub use composer::{CompositionRejection, CompositionState, ReplyTicket};
pub use draft::{Draft, EnterOutcome};
pub use error::{CoreError, CoreResult};
pub use message::{ConversationId, Message, MessageId, NewMessage, Role, unix_now_ms};
pub use roster::{ConversationRoster, ConversationSummary};
pub use session::{Navigator, Route, SessionContext, SessionProvider, resolve_route};
pub use shell::{
    MOBILE_BREAKPOINT_PX, SIDEBAR_COLLAPSED_WIDTH_PX, SIDEBAR_EXPANDED_WIDTH_PX, ShellLayout,
    ShellRejection, ShellState, Viewport,
};
pub use transcript::Transcript;
