use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::AnalysisService;
use crate::error::FinsightsError;

/// Shown in place of an answer when a query fails.
pub const FALLBACK_REPLY: &str = "Sorry, an error occurred. Please try again.";

/// Starter questions offered while the conversation is empty.
pub const PROMPT_SUGGESTIONS: [&str; 5] = [
    "What are my top spending categories?",
    "Show my monthly income trends",
    "Identify recurring subscriptions",
    "Find potential savings opportunities",
    "Analyze my dining expenses",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Another query is outstanding; nothing changed.
    Busy,
    Answered,
    /// The fallback reply was appended.
    Failed,
    /// The page was torn down before the answer arrived.
    Discarded,
}

#[derive(Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
}

/// Question/answer log against one document.
///
/// At most one query is outstanding at a time; messages are only ever
/// appended.
pub struct ChatSession {
    document_id: Option<String>,
    service: Arc<dyn AnalysisService>,
    state: Mutex<ChatState>,
    disposed: CancellationToken,
}

impl ChatSession {
    pub fn new(
        document_id: Option<String>,
        service: Arc<dyn AnalysisService>,
        disposed: CancellationToken,
    ) -> Self {
        Self {
            document_id,
            service,
            state: Mutex::new(ChatState::default()),
            disposed,
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state.lock().input = text.into();
    }

    /// Send the pending input buffer.
    pub async fn submit_input(&self) -> SendOutcome {
        let text = self.input();
        self.send_query(&text).await
    }

    /// Suggestions on offer: all of [`PROMPT_SUGGESTIONS`] until the first
    /// message, none afterwards.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.is_empty() {
            &PROMPT_SUGGESTIONS
        } else {
            &[]
        }
    }

    /// Send one of the suggestions on offer.
    pub async fn send_suggestion(&self, index: usize) -> SendOutcome {
        match self.suggestions().get(index) {
            Some(text) => self.send_query(text).await,
            None => SendOutcome::Ignored,
        }
    }

    pub async fn send_query(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        {
            let mut state = self.state.lock();
            if state.loading {
                return SendOutcome::Busy;
            }
            state.messages.push(ChatMessage::user(text));
            state.input.clear();
            state.loading = true;
        }

        let result = match self.document_id.as_deref() {
            Some(id) => self.service.query(id, text).await.map(|r| r.result),
            None => Err(FinsightsError::MissingIdentity),
        };

        let mut state = self.state.lock();
        state.loading = false;
        if self.disposed.is_cancelled() {
            tracing::debug!("chat answer arrived after the page closed");
            return SendOutcome::Discarded;
        }
        match result {
            Ok(answer) => {
                state.messages.push(ChatMessage::assistant(answer));
                SendOutcome::Answered
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat query failed");
                state.messages.push(ChatMessage::assistant(FALLBACK_REPLY));
                SendOutcome::Failed
            }
        }
    }
}
