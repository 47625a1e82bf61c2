/// Unsent input state for the active conversation.
///
/// The attachment panel flag is independent of the text; neither submission
/// nor typing touches it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    text: String,
    attachment_panel_open: bool,
}

/// What one Enter key press did to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Plain Enter on a non-empty draft: the trimmed text, draft cleared.
    Submitted(String),
    /// Shift+Enter: a line break was inserted, nothing submitted.
    NewlineInserted,
    /// Plain Enter on whitespace-only text: nothing happened.
    Ignored,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the draft text. No validation; empty is fine while typing.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn attachment_panel_open(&self) -> bool {
        self.attachment_panel_open
    }

    /// Flips panel visibility and returns the new value.
    pub fn toggle_attachment_panel(&mut self) -> bool {
        self.attachment_panel_open = !self.attachment_panel_open;
        self.attachment_panel_open
    }

    /// Enter submits, Shift+Enter inserts a newline. The text is cleared only
    /// on a successful submission.
    pub fn handle_enter(&mut self, shift: bool) -> EnterOutcome {
        if shift {
            self.text.push('\n');
            return EnterOutcome::NewlineInserted;
        }

        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return EnterOutcome::Ignored;
        }

        let content = trimmed.to_string();
        self.text.clear();
        EnterOutcome::Submitted(content)
    }
}
