//! Messages attached to a toy.
//!
//! Message writes go through the same copy/flush/publish path as every
//! other store mutation.

use crate::error::{Result, StoreError};
use crate::store::{find_mut, ToyStore};
use crate::subscriptions::StoreEvent;
use crate::types::{Message, MessageDraft, MessageId, Timestamp, ToyId};
use tracing::debug;

impl ToyStore {
    /// Append a message to a toy. Returns the stored message.
    pub fn add_message(&self, toy_id: &ToyId, draft: MessageDraft) -> Result<Message> {
        let txt = draft.txt.trim();
        if txt.is_empty() {
            return Err(StoreError::Validation("message text is required".into()));
        }
        let txt = txt.to_string();

        let message = self.mutate(|toys| {
            let toy = find_mut(toys, toy_id)?;
            let id = self
                .ids
                .generate(|candidate| toy.messages.iter().any(|m| m.id.as_str() == candidate))?;

            let message = Message {
                id: MessageId(id),
                txt,
                by: draft.by,
                created_at: Timestamp::now(),
            };
            toy.messages.push(message.clone());

            let event = StoreEvent::MessageAdded {
                toy_id: toy_id.clone(),
                message: message.clone(),
            };
            Ok((message, event))
        })?;

        debug!(toy = %toy_id, message = %message.id, "added message");
        Ok(message)
    }

    /// Remove a message from a toy. Returns the removed message's id.
    pub fn remove_message(&self, toy_id: &ToyId, message_id: &MessageId) -> Result<MessageId> {
        self.mutate(|toys| {
            let toy = find_mut(toys, toy_id)?;
            let idx = toy
                .messages
                .iter()
                .position(|m| &m.id == message_id)
                .ok_or_else(|| StoreError::MessageNotFound {
                    toy: toy_id.clone(),
                    message: message_id.clone(),
                })?;
            toy.messages.remove(idx);

            let event = StoreEvent::MessageRemoved {
                toy_id: toy_id.clone(),
                message_id: message_id.clone(),
            };
            Ok(((), event))
        })?;

        debug!(toy = %toy_id, message = %message_id, "removed message");
        Ok(message_id.clone())
    }

    /// Messages of a toy, oldest first.
    pub fn messages(&self, toy_id: &ToyId) -> Result<Vec<Message>> {
        Ok(self.get(toy_id)?.messages)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::store::{StoreConfig, ToyStore};
    use crate::types::{MessageDraft, MessageId, ToyDraft, ToyId, UserRef};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> ToyStore {
        ToyStore::open(StoreConfig::at(dir.path().join("toy.json"))).unwrap()
    }

    #[test]
    fn test_add_then_remove() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let toy = store.create(ToyDraft::new("Robot", 10.0), None).unwrap();

        let msg = store
            .add_message(&toy.id, MessageDraft::new("hi", UserRef::new("u1")))
            .unwrap();
        assert_eq!(msg.txt, "hi");
        assert_eq!(msg.by, UserRef::new("u1"));
        assert_eq!(store.messages(&toy.id).unwrap(), vec![msg.clone()]);

        let removed = store.remove_message(&toy.id, &msg.id).unwrap();
        assert_eq!(removed, msg.id);
        assert!(store.messages(&toy.id).unwrap().is_empty());
    }

    #[test]
    fn test_messages_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let toy = store.create(ToyDraft::new("Robot", 10.0), None).unwrap();

        for txt in ["one", "two", "three"] {
            store
                .add_message(&toy.id, MessageDraft::new(txt, UserRef::new("u1")))
                .unwrap();
        }

        let texts: Vec<String> = store
            .messages(&toy.id)
            .unwrap()
            .into_iter()
            .map(|m| m.txt)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_add_to_missing_toy() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let result = store.add_message(&ToyId::from("nope"), MessageDraft::new("hi", UserRef::new("u1")));
        assert!(matches!(result, Err(StoreError::ToyNotFound(_))));
    }

    #[test]
    fn test_blank_message_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let toy = store.create(ToyDraft::new("Robot", 10.0), None).unwrap();

        let result = store.add_message(&toy.id, MessageDraft::new("  ", UserRef::new("u1")));
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_remove_missing_message() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let toy = store.create(ToyDraft::new("Robot", 10.0), None).unwrap();

        let result = store.remove_message(&toy.id, &MessageId::from("ghost"));
        assert!(matches!(result, Err(StoreError::MessageNotFound { .. })));

        let result = store.remove_message(&ToyId::from("nope"), &MessageId::from("ghost"));
        assert!(matches!(result, Err(StoreError::ToyNotFound(_))));
    }
}
