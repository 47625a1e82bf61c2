use std::fmt;

use crate::message::ConversationId;

/// Where the shell can send the user. Paths mirror the web client routes the
/// surrounding application serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Chat(ConversationId),
    Settings,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Chat(_) | Self::Settings)
    }

    pub fn as_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Chat(id) => format!("/chat/{id}"),
            Self::Settings => "/settings".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_path())
    }
}

/// Navigation capability owned by the surrounding shell. The core signals
/// route changes; it never implements routing itself.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Immutable snapshot of the signed-in user.
///
/// Created at sign-in and replaced as a whole at sign-out, so consumers never
/// observe a half-updated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    authenticated: bool,
    user_email: Option<String>,
}

impl SessionContext {
    pub fn authenticated(user_email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            user_email: Some(user_email.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user_email: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Display string for the signed-in user, absent when anonymous.
    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }
}

/// Source of the current session. The core only reads; sign-out mutates the
/// provider, never the core's own state.
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> SessionContext;
    fn sign_out(&self);
}

/// Route guard: protected routes require an authenticated session.
pub fn resolve_route(requested: Route, session: &SessionContext) -> Route {
    if requested.requires_auth() && !session.is_authenticated() {
        Route::Login
    } else {
        requested
    }
}
