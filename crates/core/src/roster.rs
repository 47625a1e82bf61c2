use crate::message::ConversationId;
use crate::session::Route;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;
// 2023-06-15T00:00:00Z; demo data stands in for server-provided history.
const SEED_BASE_UNIX_MS: u64 = 1_686_787_200_000;

/// Read-only summary of a past conversation, created out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub last_activity_unix_ms: u64,
}

impl ConversationSummary {
    pub fn new(
        id: ConversationId,
        title: impl Into<String>,
        last_activity_unix_ms: u64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            last_activity_unix_ms,
        }
    }
}

/// Conversation list with a case-insensitive title filter.
///
/// The roster never touches message state; selecting a conversation only
/// yields a navigation route.
#[derive(Debug, Default)]
pub struct ConversationRoster {
    conversations: Vec<ConversationSummary>,
    query: String,
}

impl ConversationRoster {
    pub fn new(conversations: Vec<ConversationSummary>) -> Self {
        Self {
            conversations,
            query: String::new(),
        }
    }

    pub fn with_seed_data() -> Self {
        Self::new(vec![
            ConversationSummary::new(
                ConversationId::new(1),
                "Business Planning Discussion",
                SEED_BASE_UNIX_MS,
            ),
            ConversationSummary::new(
                ConversationId::new(2),
                "Tax Consultation",
                SEED_BASE_UNIX_MS - DAY_MS,
            ),
            ConversationSummary::new(
                ConversationId::new(3),
                "VAT Registration Help",
                SEED_BASE_UNIX_MS - 2 * DAY_MS,
            ),
            ConversationSummary::new(
                ConversationId::new(4),
                "Ministry Guidelines",
                SEED_BASE_UNIX_MS - 3 * DAY_MS,
            ),
        ])
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Stores the active search string as typed; matching normalizes it.
    pub fn set_query(&mut self, raw: impl Into<String>) {
        self.query = raw.into();
    }

    /// Lazy view of the summaries whose title contains the query, preserving
    /// the original relative order. An empty query yields everything.
    pub fn visible(&self) -> impl Iterator<Item = &ConversationSummary> {
        let needle = self.query.trim().to_ascii_lowercase();
        self.conversations.iter().filter(move |conversation| {
            needle.is_empty() || conversation.title.to_ascii_lowercase().contains(&needle)
        })
    }

    pub fn get(&self, id: ConversationId) -> Option<&ConversationSummary> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    /// Signals navigation for a known conversation. Does not mutate message
    /// state; reloading the transcript is the coordinator's job.
    pub fn select(&self, id: ConversationId) -> Option<Route> {
        self.get(id).map(|conversation| Route::Chat(conversation.id))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
