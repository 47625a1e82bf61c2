use std::fmt;

/// Identifier for one scheduled reply.
///
/// This must change on every submission so a stale timer completion can be
/// rejected instead of mutating a conversation it no longer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyTicket(pub u64);

impl ReplyTicket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ReplyTicket {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// "Assistant is composing" indicator state.
///
/// `Composing` holds exactly while one pending reply timer exists; terminal
/// transitions must present the ticket of that timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing {
        ticket: ReplyTicket,
        since_unix_ms: u64,
    },
}

/// Rejection reason for an illegal composition transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionRejection {
    AlreadyComposing {
        active: ReplyTicket,
        attempted: ReplyTicket,
    },
    NotComposing {
        attempted: ReplyTicket,
    },
    TicketMismatch {
        active: ReplyTicket,
        attempted: ReplyTicket,
    },
}

impl CompositionState {
    pub fn is_composing(&self) -> bool {
        matches!(self, Self::Composing { .. })
    }

    /// Returns the outstanding ticket if and only if a reply is pending.
    pub fn active_ticket(&self) -> Option<ReplyTicket> {
        match self {
            Self::Composing { ticket, .. } => Some(*ticket),
            Self::Idle => None,
        }
    }

    pub fn since_unix_ms(&self) -> Option<u64> {
        match self {
            Self::Composing { since_unix_ms, .. } => Some(*since_unix_ms),
            Self::Idle => None,
        }
    }

    /// Returns true when a timer completion carries the outstanding ticket.
    pub fn accepts(&self, ticket: ReplyTicket) -> bool {
        self.active_ticket() == Some(ticket)
    }

    /// `Idle -> Composing`. Submissions are serialized: beginning while a
    /// ticket is outstanding is rejected rather than restarting the timer.
    pub fn begin(
        &mut self,
        ticket: ReplyTicket,
        now_unix_ms: u64,
    ) -> Result<(), CompositionRejection> {
        match self {
            Self::Composing { ticket: active, .. } => {
                Err(CompositionRejection::AlreadyComposing {
                    active: *active,
                    attempted: ticket,
                })
            }
            Self::Idle => {
                *self = Self::Composing {
                    ticket,
                    since_unix_ms: now_unix_ms,
                };
                Ok(())
            }
        }
    }

    /// `Composing -> Idle` after the reply was appended.
    pub fn finish(&mut self, ticket: ReplyTicket) -> Result<(), CompositionRejection> {
        self.end(ticket)
    }

    /// `Composing -> Idle` after reply generation failed. The caller appends
    /// an assistant-unavailable message in place of the reply.
    pub fn fail(&mut self, ticket: ReplyTicket) -> Result<(), CompositionRejection> {
        self.end(ticket)
    }

    /// Unconditional `-> Idle`, used when the conversation goes away.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    fn end(&mut self, ticket: ReplyTicket) -> Result<(), CompositionRejection> {
        match self {
            Self::Composing { ticket: active, .. } if *active == ticket => {
                *self = Self::Idle;
                Ok(())
            }
            Self::Composing { ticket: active, .. } => Err(CompositionRejection::TicketMismatch {
                active: *active,
                attempted: ticket,
            }),
            Self::Idle => Err(CompositionRejection::NotComposing { attempted: ticket }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_from_idle_records_ticket_and_start_time() {
        let mut state = CompositionState::default();

        state.begin(ReplyTicket::new(1), 42).unwrap();

        assert!(state.is_composing());
        assert_eq!(state.active_ticket(), Some(ReplyTicket::new(1)));
        assert_eq!(state.since_unix_ms(), Some(42));
    }

    #[test]
    fn begin_while_composing_is_rejected() {
        let mut state = CompositionState::default();
        state.begin(ReplyTicket::new(1), 0).unwrap();

        let rejection = state.begin(ReplyTicket::new(2), 1).unwrap_err();

        assert_eq!(
            rejection,
            CompositionRejection::AlreadyComposing {
                active: ReplyTicket::new(1),
                attempted: ReplyTicket::new(2),
            }
        );
        assert_eq!(state.active_ticket(), Some(ReplyTicket::new(1)));
    }

    #[test]
    fn finish_with_matching_ticket_returns_to_idle() {
        let mut state = CompositionState::default();
        state.begin(ReplyTicket::new(7), 0).unwrap();

        state.finish(ReplyTicket::new(7)).unwrap();

        assert_eq!(state, CompositionState::Idle);
    }

    #[test]
    fn stale_ticket_is_rejected_and_state_is_unchanged() {
        let mut state = CompositionState::default();
        state.begin(ReplyTicket::new(7), 0).unwrap();

        let rejection = state.finish(ReplyTicket::new(6)).unwrap_err();

        assert_eq!(
            rejection,
            CompositionRejection::TicketMismatch {
                active: ReplyTicket::new(7),
                attempted: ReplyTicket::new(6),
            }
        );
        assert!(state.is_composing());
    }

    #[test]
    fn finish_while_idle_is_rejected() {
        let mut state = CompositionState::default();

        let rejection = state.fail(ReplyTicket::new(1)).unwrap_err();

        assert_eq!(
            rejection,
            CompositionRejection::NotComposing {
                attempted: ReplyTicket::new(1),
            }
        );
    }

    #[test]
    fn cancel_always_lands_on_idle() {
        let mut state = CompositionState::default();
        state.cancel();
        assert_eq!(state, CompositionState::Idle);

        state.begin(ReplyTicket::new(3), 0).unwrap();
        state.cancel();
        assert_eq!(state, CompositionState::Idle);
    }

    #[test]
    fn accepts_only_the_outstanding_ticket() {
        let mut state = CompositionState::default();
        assert!(!state.accepts(ReplyTicket::new(1)));

        state.begin(ReplyTicket::new(1), 0).unwrap();
        assert!(state.accepts(ReplyTicket::new(1)));
        assert!(!state.accepts(ReplyTicket::new(2)));
    }
}
