use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CoreError {
    #[snafu(display("message content is empty after trimming"))]
    EmptyMessageContent { stage: &'static str },
    #[snafu(display("assistant reply generation failed: {reason}"))]
    AssistantUnavailable {
        stage: &'static str,
        reason: String,
    },
    #[snafu(display("viewport width {width} is not a usable measurement"))]
    InvalidViewportWidth { stage: &'static str, width: f32 },
}

impl CoreError {
    /// Builds the reply-failure variant for sources outside this crate.
    pub fn assistant_unavailable(reason: impl Into<String>) -> Self {
        Self::AssistantUnavailable {
            stage: "generate-reply",
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
