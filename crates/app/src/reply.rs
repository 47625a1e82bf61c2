use confab_core::CoreResult;

/// Fixed assistant reply used until a real backend exists.
pub const CANNED_REPLY: &str = "I'm an AI assistant. I'm here to help you with your questions.";

/// Shown in place of a reply when generation fails.
pub const ASSISTANT_UNAVAILABLE_NOTICE: &str =
    "The assistant is unavailable right now. Please try again.";

/// Starter prompts offered while the conversation is still empty.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "How do I register a company?",
    "What are the VAT requirements?",
    "Guide me through tax filing",
    "Export-import regulations",
];

/// Produces the assistant's reply text for one submitted prompt.
///
/// Failure maps to the assistant-unavailable error; callers surface it inside
/// the conversation rather than dropping the turn.
pub trait ReplySource: Send + Sync {
    fn reply_to(&self, prompt: &str) -> CoreResult<String>;
}

/// Hard-coded reply source; the prompt does not influence the answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedReplies;

impl ReplySource for CannedReplies {
    fn reply_to(&self, _prompt: &str) -> CoreResult<String> {
        Ok(CANNED_REPLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_source_always_answers() {
        let source = CannedReplies;

        let reply = source.reply_to("What are the VAT requirements?").unwrap();

        assert_eq!(reply, CANNED_REPLY);
    }
}
