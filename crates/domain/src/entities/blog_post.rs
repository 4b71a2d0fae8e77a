use crate::validation::{CreateMode, FieldReader, Presence, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Category stamped on posts created without one.
pub const DEFAULT_BLOG_CATEGORY: &str = "교육경험";

/// Experience post shown in the blog feed. Hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub category: String,
    pub tags: Option<Vec<String>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create payload. Defaulted columns stay `None` until stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// Partial update. `summary` and `tags` are nullable, hence the nested options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogPostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<Option<String>>,
    pub category: Option<String>,
    pub tags: Option<Option<Vec<String>>>,
    pub is_published: Option<bool>,
}

impl NewBlogPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            summary: None,
            category: None,
            tags: None,
            is_published: None,
        }
    }

    pub fn parse(value: &Value, mode: CreateMode) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new(value)?;
        let defaulted = Presence::defaulted(mode);

        let title = reader.text("title", Presence::Required, true);
        let content = reader.text("content", Presence::Required, true);
        let summary = reader.nullable_text("summary", defaulted);
        let category = reader.text("category", defaulted, false);
        let tags = reader.nullable_string_list("tags", defaulted);
        let is_published = reader.boolean("isPublished", defaulted);
        reader.finish()?;

        match (title, content) {
            (Some(title), Some(content)) => Ok(Self {
                title,
                content,
                summary: summary.flatten(),
                category,
                tags: tags.flatten(),
                is_published,
            }),
            _ => Err(ValidationErrors::single("", "Required fields missing")),
        }
    }
}

impl BlogPostChanges {
    pub fn parse(value: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new(value)?;
        let changes = Self {
            title: reader.text("title", Presence::Optional, true),
            content: reader.text("content", Presence::Optional, true),
            summary: reader.nullable_text("summary", Presence::Optional),
            category: reader.text("category", Presence::Optional, false),
            tags: reader.nullable_string_list("tags", Presence::Optional),
            is_published: reader.boolean("isPublished", Presence::Optional),
        };
        reader.finish()?;
        Ok(changes)
    }
}

impl BlogPost {
    /// Materialize a new post: fresh id, defaults applied, both timestamps `now`.
    pub fn create(input: NewBlogPost, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            content: input.content,
            summary: input.summary.filter(|s| !s.is_empty()),
            category: input
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_BLOG_CATEGORY.to_string()),
            tags: input.tags,
            is_published: input.is_published.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: BlogPostChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(summary) = changes.summary {
            self.summary = summary;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(is_published) = changes.is_published {
            self.is_published = is_published;
        }
        self.updated_at = now;
    }
}
