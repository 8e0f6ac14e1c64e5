//! Conversation page: document, transactions and insights panels next to a
//! chat about the same statement.

pub mod chat;
pub mod page;
pub mod panel;
pub mod render;
pub mod view;

pub use chat::{ChatMessage, ChatSession, Role, SendOutcome, FALLBACK_REPLY, PROMPT_SUGGESTIONS};
pub use page::{ConversationPage, PageSnapshot};
pub use panel::PanelState;
pub use view::{DocumentViewer, ViewMode};
