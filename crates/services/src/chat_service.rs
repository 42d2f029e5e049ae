use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use care_core::model::{ChatTranscript, ERROR_REPLY, Speaker, sanitize_reply, styled_prompt};

use crate::api::AssistantApi;
use crate::cancel::CancelToken;
use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Blank input; the transcript is unchanged.
    Ignored,
    /// The whole reply has been revealed.
    Completed,
    /// The token fired while waiting or typing; the partial reply stays.
    Cancelled,
}

/// Conversation with the ML assistant, revealed one character per tick.
#[derive(Clone)]
pub struct ChatService {
    assistant: Arc<dyn AssistantApi>,
    typing_interval: Duration,
}

impl ChatService {
    #[must_use]
    pub fn new(assistant: Arc<dyn AssistantApi>, typing_interval: Duration) -> Self {
        Self {
            assistant,
            typing_interval,
        }
    }

    #[must_use]
    pub fn typing_interval(&self) -> Duration {
        self.typing_interval
    }

    /// Send `input` and type out the reply into `transcript`.
    ///
    /// `on_update` runs after every visible change. Cancelling `cancel` drops
    /// the in-flight request or stops the reveal at the next tick.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Api` when the assistant cannot be reached; the error
    /// bubble has already been appended.
    pub async fn send<F>(
        &self,
        transcript: &mut ChatTranscript,
        input: &str,
        cancel: &CancelToken,
        mut on_update: F,
    ) -> Result<ChatOutcome, ChatError>
    where
        F: FnMut(&ChatTranscript),
    {
        if input.trim().is_empty() {
            return Ok(ChatOutcome::Ignored);
        }

        transcript.push(Speaker::User, input);
        on_update(transcript);

        let prompt = styled_prompt(input);
        let reply = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("chat request cancelled before a reply");
                return Ok(ChatOutcome::Cancelled);
            }
            reply = self.assistant.chat(&prompt) => reply,
        };

        let reply = match reply {
            Ok(reply) => sanitize_reply(reply.as_deref()),
            Err(err) => {
                warn!("assistant request failed: {err}");
                transcript.push(Speaker::Assistant, ERROR_REPLY);
                on_update(transcript);
                return Err(err.into());
            }
        };

        let id = transcript.push(Speaker::Assistant, "");
        on_update(transcript);
        debug!("revealing {} characters", reply.chars().count());

        for shown in reveal_prefixes(&reply) {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("chat reveal stopped");
                    return Ok(ChatOutcome::Cancelled);
                }
                () = tokio::time::sleep(self.typing_interval) => {}
            }
            transcript.set_text(id, shown);
            on_update(transcript);
        }
        Ok(ChatOutcome::Completed)
    }
}

/// Every non-empty prefix of `text` on a character boundary, shortest first.
pub fn reveal_prefixes(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(start, ch)| start + ch.len_utf8())
        .map(move |end| &text[..end])
}
