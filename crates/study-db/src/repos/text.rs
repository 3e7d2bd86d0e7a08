//! Text repository: saved flag, kind filters and conversation reads.

use std::sync::Arc;

use study_core::entities::{Conversation, NewText, Text};
use study_core::enums::TextKind;
use study_core::views::TextWithConversations;

use crate::backend::QueryBackend;
use crate::error::DatabaseError;
use crate::helpers::RowReader;
use crate::query::{Column, Embed, Filter, Row, Select};
use crate::record::Record;
use crate::repos::conversation::ConversationColumn;
use crate::repository::Repository;
use crate::table::TableRepository;
use crate::updates::{TextUpdate, TextUpdateBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Id,
    UserId,
    Title,
    Content,
    Kind,
    OriginalPrompt,
    Saved,
    CreatedAt,
}

impl Column for TextColumn {
    const TABLE: &'static str = "texts";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Title => "title",
            Self::Content => "content",
            Self::Kind => "kind",
            Self::OriginalPrompt => "original_prompt",
            Self::Saved => "saved",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Record for Text {
    type Column = TextColumn;
    type Create = NewText;
    type Update = TextUpdate;

    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.string("id")?,
            user_id: r.string("user_id")?,
            title: r.string("title")?,
            content: r.string("content")?,
            kind: r.enum_value("kind")?,
            original_prompt: r.opt_string("original_prompt")?,
            saved: r.bool("saved")?,
            created_at: r.datetime("created_at")?,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct TextRepo {
    table: TableRepository<Text>,
}

impl Repository for TextRepo {
    type Record = Text;

    fn table(&self) -> &TableRepository<Text> {
        &self.table
    }
}

impl TextRepo {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            table: TableRepository::new(backend),
        }
    }

    fn by_user(user_id: &str) -> Filter<TextColumn> {
        Filter::new().eq(TextColumn::UserId, user_id)
    }

    fn by_title(user_id: &str, title: &str) -> Filter<TextColumn> {
        Self::by_user(user_id).eq(TextColumn::Title, title)
    }

    async fn newest_first(&self, filter: Filter<TextColumn>) -> Result<Vec<Text>, DatabaseError> {
        self.table
            .select(Select::new().filter(filter).order_desc(TextColumn::CreatedAt))
            .await
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Text>, DatabaseError> {
        self.newest_first(Self::by_user(user_id)).await
    }

    pub async fn find_saved(&self, user_id: &str) -> Result<Vec<Text>, DatabaseError> {
        self.newest_first(Self::by_user(user_id).eq(TextColumn::Saved, true))
            .await
    }

    pub async fn find_by_kind(&self, user_id: &str, kind: TextKind) -> Result<Vec<Text>, DatabaseError> {
        self.newest_first(Self::by_user(user_id).eq(TextColumn::Kind, kind))
            .await
    }

    pub async fn find_by_title(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Text>, DatabaseError> {
        self.table.find_one_where(&Self::by_title(user_id, title)).await
    }

    pub async fn update_by_title(
        &self,
        user_id: &str,
        title: &str,
        data: &TextUpdate,
    ) -> Result<Option<Text>, DatabaseError> {
        let updated = self
            .table
            .update_where(&Self::by_title(user_id, title), data)
            .await?;
        Ok(updated.into_iter().next())
    }

    pub async fn delete_by_title(&self, user_id: &str, title: &str) -> Result<bool, DatabaseError> {
        let deleted = self.table.delete_where(&Self::by_title(user_id, title)).await?;
        Ok(deleted > 0)
    }

    /// The text with its conversations, oldest exchange first.
    pub async fn find_with_conversations(
        &self,
        id: &str,
    ) -> Result<Option<TextWithConversations>, DatabaseError> {
        let select = Select::new()
            .filter(Filter::new().eq(TextColumn::Id, id))
            .embed(
                Embed::children(ConversationColumn::TextId)
                    .order_asc(ConversationColumn::CreatedAt),
            );
        let Some(row) = self.table.select_one_row(select).await? else {
            return Ok(None);
        };
        Ok(Some(TextWithConversations {
            text: Text::from_row(&row)?,
            conversations: RowReader::new(Text::TABLE, &row).embedded_many::<Conversation>()?,
        }))
    }

    /// Unconditional write of the saved flag. `None` if no text has this id.
    pub async fn set_saved(&self, id: &str, saved: bool) -> Result<Option<Text>, DatabaseError> {
        let update = TextUpdateBuilder::new().saved(saved).build();
        self.table.update_by_id(id, &update).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{seed_text, seed_user, test_store};

    use super::*;

    #[tokio::test]
    async fn new_text_defaults() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let text = seed_text(&store, &user.id, "Notes").await;

        assert!(text.id.starts_with("txt-"));
        assert_eq!(text.kind, TextKind::Text);
        assert!(!text.saved);
        assert_eq!(text.original_prompt, None);
    }

    #[tokio::test]
    async fn saved_and_kind_filters() {
        let store = test_store().await;
        let user = seed_user(&store, "ana@example.com").await;
        let notes = seed_text(&store, &user.id, "Notes").await;
        let summary = store
            .texts()
            .create(&NewText {
                user_id: user.id.clone(),
                title: "Summary".into(),
                content: "short".into(),
                kind: Some(TextKind::Summary),
                original_prompt: Some("summarize chapter 1".into()),
                saved: None,
            })
            .await
            .unwrap();

        let saved = store.texts().set_saved(&notes.id, true).await.unwrap().unwrap();
        assert!(saved.saved);
        assert_eq!(store.texts().find_saved(&user.id).await.unwrap(), vec![saved]);
        assert_eq!(
            store.texts().find_by_kind(&user.id, TextKind::Summary).await.unwrap(),
            vec![summary]
        );
        assert!(store.texts().set_saved("txt-missing", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn title_lookups_expect_one_row() {
        let store = test_store().await;
        let ana = seed_user(&store, "ana@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let notes = seed_text(&store, &ana.id, "Notes").await;
        seed_text(&store, &bob.id, "Notes").await;

        assert_eq!(
            store.texts().find_by_title(&ana.id, "Notes").await.unwrap(),
            Some(notes)
        );
        assert_eq!(store.texts().find_by_title(&ana.id, "Other").await.unwrap(), None);

        let update = TextUpdateBuilder::new().content("rewritten").build();
        let updated = store
            .texts()
            .update_by_title(&ana.id, "Notes", &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "rewritten");

        assert!(store.texts().delete_by_title(&ana.id, "Notes").await.unwrap());
        assert!(!store.texts().delete_by_title(&ana.id, "Notes").await.unwrap());
        assert!(store.texts().find_by_title(&bob.id, "Notes").await.unwrap().is_some());
    }
}
