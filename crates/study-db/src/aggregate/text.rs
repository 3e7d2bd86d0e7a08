//! Text operations spanning texts and their conversations.

use study_core::entities::{Conversation, NewConversation, NewText, Text};
use study_core::views::TextWithConversations;

use crate::aggregate::cascade;
use crate::error::DatabaseError;
use crate::query::Filter;
use crate::repos::{ConversationRepo, TextColumn, TextRepo};
use crate::repository::Repository;
use crate::updates::TextUpdateBuilder;

#[derive(Clone)]
pub struct TextAggregator {
    texts: TextRepo,
    conversations: ConversationRepo,
}

impl TextAggregator {
    #[must_use]
    pub const fn new(texts: TextRepo, conversations: ConversationRepo) -> Self {
        Self {
            texts,
            conversations,
        }
    }

    /// Flip the saved flag. `None` if no text has this id.
    ///
    /// The write only applies while the flag still holds the value just
    /// read; if another writer changed it in between, the result is
    /// [`DatabaseError::Conflict`] and nothing is written.
    pub async fn toggle_saved(&self, id: &str) -> Result<Option<Text>, DatabaseError> {
        let Some(current) = self.texts.find_by_id(id).await? else {
            return Ok(None);
        };
        let expected = Filter::new()
            .eq(TextColumn::Id, id)
            .eq(TextColumn::Saved, current.saved);
        let update = TextUpdateBuilder::new().saved(!current.saved).build();

        let mut updated = self.texts.update_where(&expected, &update).await?;
        if let Some(text) = updated.pop() {
            return Ok(Some(text));
        }
        if self.texts.find_by_id(id).await?.is_none() {
            return Ok(None);
        }
        tracing::warn!(text_id = id, "saved flag changed concurrently");
        Err(DatabaseError::Conflict(format!(
            "text {id} changed while toggling saved"
        )))
    }

    pub async fn get_with_conversations(
        &self,
        id: &str,
    ) -> Result<Option<TextWithConversations>, DatabaseError> {
        self.texts.find_with_conversations(id).await
    }

    /// Create the text together with its first exchange. If the exchange
    /// cannot be written the text is removed again.
    pub async fn create_with_conversation(
        &self,
        text: &NewText,
        prompt: &str,
        response: &str,
    ) -> Result<TextWithConversations, DatabaseError> {
        let (text, conversations) = cascade::create_with_children(
            self.texts.table(),
            self.conversations.table(),
            text,
            |text: &Text| {
                vec![NewConversation {
                    text_id: text.id.clone(),
                    prompt: prompt.to_string(),
                    response: response.to_string(),
                }]
            },
        )
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "create_with_conversation failed"))?;
        Ok(TextWithConversations {
            text,
            conversations,
        })
    }

    /// Append an exchange to an existing text.
    pub async fn add_conversation(
        &self,
        text_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<Conversation, DatabaseError> {
        self.conversations
            .create(&NewConversation {
                text_id: text_id.to_string(),
                prompt: prompt.to_string(),
                response: response.to_string(),
            })
            .await
            .inspect_err(|e| tracing::warn!(text_id, error = %e, "add_conversation failed"))
    }

    /// Delete the text's conversations, then the text. Returns the number
    /// of conversations removed.
    pub async fn delete_with_conversations(&self, id: &str) -> Result<u64, DatabaseError> {
        let removed = self
            .conversations
            .delete_by_text_id(id)
            .await
            .inspect_err(|e| tracing::warn!(text_id = id, error = %e, "conversation delete failed"))?;
        self.texts
            .delete_by_id(id)
            .await
            .inspect_err(|e| tracing::warn!(text_id = id, error = %e, "text delete failed"))?;
        tracing::info!(text_id = id, conversations = removed, "text deleted with conversations");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{seed_text, seed_user, test_store};

    use super::*;

    #[tokio::test]
    async fn toggle_flips_and_flips_back() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let text = seed_text(&store, &user.id, "Notes").await;
        let aggregator = store.text_aggregator();

        let once = aggregator.toggle_saved(&text.id).await.unwrap().unwrap();
        assert!(once.saved);
        let twice = aggregator.toggle_saved(&text.id).await.unwrap().unwrap();
        assert!(!twice.saved);
        assert!(aggregator.toggle_saved("txt-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_with_conversation_and_delete() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let aggregator = store.text_aggregator();

        let created = aggregator
            .create_with_conversation(
                &NewText {
                    user_id: user.id.clone(),
                    title: "Ownership".into(),
                    content: "Each value has one owner.".into(),
                    kind: None,
                    original_prompt: None,
                    saved: None,
                },
                "Explain moves",
                "A move transfers ownership.",
            )
            .await
            .unwrap();
        assert_eq!(created.conversations.len(), 1);

        aggregator
            .add_conversation(&created.text.id, "And borrows?", "Borrows lend access.")
            .await
            .unwrap();
        let read = aggregator
            .get_with_conversations(&created.text.id)
            .await
            .unwrap()
            .unwrap();
        let prompts: Vec<_> = read.conversations.iter().map(|c| c.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["Explain moves", "And borrows?"]);

        assert_eq!(
            aggregator.delete_with_conversations(&created.text.id).await.unwrap(),
            2
        );
        assert!(aggregator.get_with_conversations(&created.text.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_conversation_to_missing_text_fails() {
        let store = test_store().await;
        let err = store
            .text_aggregator()
            .add_conversation("txt-missing", "p", "r")
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err:?}");
    }

    #[tokio::test]
    async fn delete_text_without_conversations() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let text = seed_text(&store, &user.id, "Notes").await;
        assert_eq!(
            store.text_aggregator().delete_with_conversations(&text.id).await.unwrap(),
            0
        );
        assert!(store.texts().find_by_id(&text.id).await.unwrap().is_none());
    }
}
