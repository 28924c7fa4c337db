use std::{collections::HashMap, sync::Arc};

use teloxide::types::{ChatId, MessageId};
use tokio::sync::Mutex;

use crate::dialog::Dialog;

#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    /// Create dialog in progress, if any.
    pub dialog: Option<Dialog>,
    /// Menu message edited in place by the inline buttons.
    pub hub_message_id: Option<MessageId>,
}

/// Per-chat conversation state. Lost on restart, which only aborts dialogs.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, Session>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, chat_id: ChatId) -> Session {
        let guard = self.inner.lock().await;
        guard.get(&chat_id).cloned().unwrap_or_default()
    }

    pub(crate) async fn update<F>(&self, chat_id: ChatId, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        let session = guard.entry(chat_id).or_insert_with(Session::default);
        f(session);
        session.clone()
    }

    pub(crate) async fn clear(&self, chat_id: ChatId) {
        self.inner.lock().await.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Section;

    #[tokio::test]
    async fn sessions_are_per_chat() {
        let store = SessionStore::default();
        store
            .update(ChatId(1), |s| s.dialog = Some(Dialog::new(Section::Assets)))
            .await;

        assert!(store.get(ChatId(1)).await.dialog.is_some());
        assert!(store.get(ChatId(2)).await.dialog.is_none());

        store.clear(ChatId(1)).await;
        assert!(store.get(ChatId(1)).await.dialog.is_none());
    }
}
