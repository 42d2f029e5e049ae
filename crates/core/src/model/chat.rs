use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const GREETING: &str =
    "Hi, I'm Nira. Ask me anything about PCOD, symptoms, or women's health!";
pub const FALLBACK_REPLY: &str = "I'm still learning! Please ask something else.";
pub const ERROR_REPLY: &str = "Error contacting the assistant. Please try again later.";

const STYLE_SUFFIX: &str = "\n\nPlease respond professionally, concisely, and in short bullet points if applicable. Avoid long paragraphs.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: Uuid,
    speaker: Speaker,
    text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered conversation shown in the chat window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::new(Speaker::Assistant, GREETING)],
        }
    }
}

impl ChatTranscript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> Uuid {
        let message = ChatMessage::new(speaker, text);
        let id = message.id();
        self.messages.push(message);
        id
    }

    /// Replace the text of a message. Returns `false` if the id is unknown.
    pub fn set_text(&mut self, id: Uuid, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text.clear();
                message.text.push_str(text);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Prompt sent to the assistant for a user message.
#[must_use]
pub fn styled_prompt(input: &str) -> String {
    format!("{input}{STYLE_SUFFIX}")
}

/// Strip markdown emphasis and substitute the fallback for an empty reply.
#[must_use]
pub fn sanitize_reply(reply: Option<&str>) -> String {
    let cleaned: String = reply.unwrap_or_default().replace('*', "");
    if cleaned.trim().is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        cleaned
    }
}
