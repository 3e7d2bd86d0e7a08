//! Conversation repository.

use std::sync::Arc;

use study_core::entities::{Conversation, NewConversation};

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Filter, Row, Select};
use crate::record::Record;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::ConversationUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationColumn {
    Id,
    TextId,
    Prompt,
    Response,
    CreatedAt,
}

impl Column for ConversationColumn {
    const TABLE: &'static str = "conversations";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::TextId => "text_id",
            Self::Prompt => "prompt",
            Self::Response => "response",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Conversation {
    type Column = ConversationColumn;
    type Create = NewConversation;
    type Update = ConversationUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            text_id: r.string("text_id")?,
            prompt: r.string("prompt")?,
            response: r.string("response")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct ConversationRepo {
    table: TableRepository<Conversation>,
}

impl Repository for ConversationRepo {
    type Record = Conversation;

    fn table(&self) -> &TableRepository<Conversation> {
        &self.table
    }
}

impl ConversationRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn by_text(text_id: &str) -> Filter<ConversationColumn> {
        Filter::new().eq(ConversationColumn::TextId, text_id)
    }

    /// The text's exchanges, oldest first.
    pub async fn find_by_text_id(&self, text_id: &str) -> Result<Vec<Conversation>, DatabaseError> {
        self.table
            .select(
                Select::new()
                    .filter(Self::by_text(text_id))
                    .order_asc(ConversationColumn::CreatedAt),
            )
            .await
    }

    pub async fn find_latest(&self, text_id: &str) -> Result<Option<Conversation>, DatabaseError> {
        let mut rows = self
            .table
            .select(
                Select::new()
                    .filter(Self::by_text(text_id))
                    .order_desc(ConversationColumn::CreatedAt)
                    .limit(1),
            )
            .await?;
        Ok(rows.pop())
    }

    pub async fn count_by_text(&self, text_id: &str) -> Result<u64, DatabaseError> {
        self.table.count(&Self::by_text(text_id)).await
    }

    pub async fn delete_by_text_id(&self, text_id: &str) -> Result<u64, DatabaseError> {
        self.table.delete_where(&Self::by_text(text_id)).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{seed_text, seed_user, test_store};

    use super::*;

    fn exchange(text_id: &str, prompt: &str) -> NewConversation {
        NewConversation {
            text_id: text_id.to_string(),
            prompt: prompt.to_string(),
            response: format!("re: {prompt}"),
        }
    }

    #[tokio::test]
    async fn ordering_latest_and_count() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let text = seed_text(&store, &user.id, "Notes").await;
        let repo = store.conversations();
        repo.create(&exchange(&text.id, "first")).await.unwrap();
        repo.create(&exchange(&text.id, "second")).await.unwrap();

        let prompts: Vec<_> = repo
            .find_by_text_id(&text.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.prompt)
            .collect();
        assert_eq!(prompts, vec!["first", "second"]);
        assert_eq!(repo.find_latest(&text.id).await.unwrap().unwrap().prompt, "second");
        assert_eq!(repo.count_by_text(&text.id).await.unwrap(), 2);

        assert_eq!(repo.delete_by_text_id(&text.id).await.unwrap(), 2);
        assert!(repo.find_latest(&text.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conversation_needs_existing_text() {
        let store = test_store().await;
        let err = store
            .conversations()
            .create(&exchange("txt-missing", "hi"))
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err:?}");
    }
}
