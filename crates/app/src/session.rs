use std::sync::Arc;

use arc_swap::ArcSwap;

use confab_core::{SessionContext, SessionProvider};

/// Process-local session provider.
///
/// Whole contexts are swapped atomically so readers always see a consistent
/// snapshot; there is no shared mutable session global.
pub struct InMemorySession {
    current: ArcSwap<SessionContext>,
}

impl InMemorySession {
    pub fn anonymous() -> Self {
        Self {
            current: ArcSwap::from_pointee(SessionContext::anonymous()),
        }
    }

    /// Installs an authenticated context for the given display email.
    pub fn sign_in(&self, user_email: impl Into<String>) {
        self.current
            .store(Arc::new(SessionContext::authenticated(user_email)));
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl SessionProvider for InMemorySession {
    fn current(&self) -> SessionContext {
        self.current.load().as_ref().clone()
    }

    fn sign_out(&self) {
        self.current.store(Arc::new(SessionContext::anonymous()));
    }
}
