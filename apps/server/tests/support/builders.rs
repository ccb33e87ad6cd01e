use chrono::{DateTime, Duration, TimeZone, Utc};
use quill_search::models::{
    AuthorRef, CategoryRef, ContentRecord, ContentStatus, TagRef, UserRecord,
};
use uuid::Uuid;

/// Fixed reference instant; fixtures are placed relative to it
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn user(name: &str, username: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        username: Some(username.to_string()),
        avatar: None,
    }
}

pub fn tag(name: &str) -> TagRef {
    TagRef {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slugify(name),
    }
}

pub fn category(name: &str) -> CategoryRef {
    CategoryRef {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slugify(name),
    }
}

fn slugify(value: &str) -> String {
    value.trim().to_lowercase().replace(' ', "-")
}

/// Builder for blog posts
pub struct BlogBuilder {
    title: String,
    content: String,
    excerpt: String,
    status: ContentStatus,
    author: AuthorRef,
    category: Option<CategoryRef>,
    tags: Vec<TagRef>,
    views: i64,
    likes: i64,
    created_at: DateTime<Utc>,
}

impl BlogBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            excerpt: String::new(),
            status: ContentStatus::Published,
            author: AuthorRef {
                id: Uuid::new_v4(),
                name: "Staff Writer".to_string(),
                avatar: None,
            },
            category: None,
            tags: Vec::new(),
            views: 0,
            likes: 0,
            created_at: base_time(),
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = excerpt.into();
        self
    }

    pub fn draft(mut self) -> Self {
        self.status = ContentStatus::Draft;
        self
    }

    pub fn status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn author(mut self, user: &UserRecord) -> Self {
        self.author = user.author_ref();
        self
    }

    pub fn category(mut self, category: &CategoryRef) -> Self {
        self.category = Some(category.clone());
        self
    }

    pub fn tag(mut self, tag: &TagRef) -> Self {
        self.tags.push(tag.clone());
        self
    }

    pub fn views(mut self, views: i64) -> Self {
        self.views = views;
        self
    }

    pub fn likes(mut self, likes: i64) -> Self {
        self.likes = likes;
        self
    }

    /// Creation time relative to [`base_time`]
    pub fn days_ago(mut self, days: i64) -> Self {
        self.created_at = base_time() - Duration::days(days);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn build(self) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            slug: slugify(&self.title),
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            status: self.status,
            author: self.author,
            category: self.category,
            tags: self.tags,
            views: self.views,
            likes: self.likes,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
