use log::{ debug, info };
use std::sync::Arc;
use thiserror::Error;
use crate::history::ConversationStore;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ next_message_id, ChatMessage, Conversation, Role };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    Idle,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter { shift: bool },
    Char(char),
    Backspace,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendRejected {
    #[error("a reply is still pending")]
    Busy,
    #[error("message is empty")]
    EmptyInput,
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Edited,
    Sent,
    Rejected(SendRejected),
}

/// Controller behind the chat widget: owns the session's conversation and
/// routes input through the completion client and the store.
pub struct ChatWidget {
    store: ConversationStore,
    client: Arc<dyn ChatClient>,
    conversation: Conversation,
    visibility: Visibility,
    loading: Loading,
    input: String,
}

impl ChatWidget {
    pub async fn mount(store: ConversationStore, client: Arc<dyn ChatClient>) -> Self {
        let conversation = store.load().await;
        Self {
            store,
            client,
            conversation,
            visibility: Visibility::Closed,
            loading: Loading::Idle,
            input: String::new(),
        }
    }

    pub fn open(&mut self) {
        self.visibility = Visibility::Open;
    }

    pub fn close(&mut self) {
        self.visibility = Visibility::Closed;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn loading(&self) -> Loading {
        self.loading
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.conversation.messages
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation.id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn can_send(&self) -> bool {
        self.loading == Loading::Idle && !self.input.trim().is_empty()
    }

    pub async fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Enter { shift: false } => match self.send().await {
                Ok(_) => KeyOutcome::Sent,
                Err(rejected) => KeyOutcome::Rejected(rejected),
            },
            Key::Enter { shift: true } => {
                self.input.push('\n');
                KeyOutcome::Edited
            }
            Key::Char(c) => {
                self.input.push(c);
                KeyOutcome::Edited
            }
            Key::Backspace => {
                self.input.pop();
                KeyOutcome::Edited
            }
        }
    }

    /// Sends the current input as one turn and returns the updated messages.
    ///
    /// The user message is appended before the client is called; the reply
    /// is appended and the whole conversation persisted once it resolves.
    pub async fn send(&mut self) -> Result<&[ChatMessage], SendRejected> {
        if self.loading == Loading::Waiting {
            return Err(SendRejected::Busy);
        }
        if self.input.trim().is_empty() {
            return Err(SendRejected::EmptyInput);
        }

        let content = std::mem::take(&mut self.input);
        let user_id = next_message_id(self.conversation.last_message_id());
        self.conversation.messages.push(ChatMessage::new(user_id, Role::User, content));
        self.loading = Loading::Waiting;
        debug!("Conversation {} waiting for reply", self.conversation.id);

        let reply = self.client.complete(&self.conversation.messages).await;

        let reply_id = next_message_id(Some(user_id));
        self.conversation.messages.push(ChatMessage::new(reply_id, Role::Assistant, reply));
        self.conversation = self.store.save(&self.conversation).await;
        self.loading = Loading::Idle;

        Ok(&self.conversation.messages)
    }

    pub async fn clear(&mut self) {
        let previous = std::mem::take(&mut self.conversation.id);
        self.conversation = self.store.clear().await;
        info!("Cleared conversation {}, now {}", previous, self.conversation.id);
    }
}
