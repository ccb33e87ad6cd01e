use anyhow::Context as _;
use quill_search::{
    db::{HistoryStore, MemoryStore, PostgresHistoryStore},
    models::{AuthorRef, CategoryRef, ContentRecord, NewHistoryRecord, TagRef, UserRecord},
};
use sqlx::PgPool;
use std::sync::Arc;

/// The backing collections of a [`super::TestApp`], for seeding fixtures
#[derive(Clone)]
pub enum TestStore {
    Memory(Arc<MemoryStore>),
    Postgres(PgPool),
}

impl TestStore {
    pub fn memory(&self) -> Option<&MemoryStore> {
        match self {
            Self::Memory(store) => Some(store),
            Self::Postgres(_) => None,
        }
    }

    pub async fn insert_user(&self, user: &UserRecord) -> anyhow::Result<()> {
        match self {
            Self::Memory(store) => store.insert_user(user.clone()).await,
            Self::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO users (id, name, username, avatar) VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (id) DO NOTHING",
                )
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.username)
                .bind(&user.avatar)
                .execute(pool)
                .await
                .context("insert user")?;
            }
        }
        Ok(())
    }

    pub async fn insert_category(&self, category: &CategoryRef) -> anyhow::Result<()> {
        match self {
            Self::Memory(store) => store.insert_category(category.clone()).await,
            Self::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) \
                     ON CONFLICT (id) DO NOTHING",
                )
                .bind(category.id)
                .bind(&category.name)
                .bind(&category.slug)
                .execute(pool)
                .await
                .context("insert category")?;
            }
        }
        Ok(())
    }

    pub async fn insert_tag(&self, tag: &TagRef) -> anyhow::Result<()> {
        match self {
            Self::Memory(store) => store.insert_tag(tag.clone()).await,
            Self::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) \
                     ON CONFLICT (id) DO NOTHING",
                )
                .bind(tag.id)
                .bind(&tag.name)
                .bind(&tag.slug)
                .execute(pool)
                .await
                .context("insert tag")?;
            }
        }
        Ok(())
    }

    /// Insert a post. On Postgres its author, category and tags are created
    /// too when missing, since the tables carry foreign keys.
    pub async fn insert_content(&self, record: &ContentRecord) -> anyhow::Result<()> {
        let pool = match self {
            Self::Memory(store) => {
                store.insert_content(record.clone()).await;
                return Ok(());
            }
            Self::Postgres(pool) => pool,
        };

        self.insert_user(&author_user(&record.author)).await?;
        if let Some(category) = &record.category {
            self.insert_category(category).await?;
        }
        for tag in &record.tags {
            self.insert_tag(tag).await?;
        }

        sqlx::query(
            "INSERT INTO blogs (id, title, slug, content, excerpt, status, author_id, \
             category_id, views, likes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.content)
        .bind(&record.excerpt)
        .bind(record.status.as_str())
        .bind(record.author.id)
        .bind(record.category.as_ref().map(|c| c.id))
        .bind(record.views)
        .bind(record.likes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(pool)
        .await
        .with_context(|| format!("insert blog {:?}", record.title))?;

        for tag in &record.tags {
            sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES ($1, $2)")
                .bind(record.id)
                .bind(tag.id)
                .execute(pool)
                .await
                .context("link blog tag")?;
        }
        Ok(())
    }

    /// Write a history record directly, bypassing the recorder queue
    pub async fn insert_history(&self, record: NewHistoryRecord) -> anyhow::Result<()> {
        let stored = match self {
            Self::Memory(store) => store.insert(record).await,
            Self::Postgres(pool) => PostgresHistoryStore::new(pool.clone()).insert(record).await,
        };
        stored.context("insert history record")?;
        Ok(())
    }
}

fn author_user(author: &AuthorRef) -> UserRecord {
    UserRecord {
        id: author.id,
        name: author.name.clone(),
        username: None,
        avatar: author.avatar.clone(),
    }
}
