use crate::database::{blog_posts, with_connection, SqlitePool};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use domain::{BlogPost, BlogPostChanges, BlogPostRepository, DomainError, NewBlogPost};
use tracing::debug;

// Database model - separate from domain entity
#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = blog_posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct BlogPostModel {
    id: String,
    title: String,
    content: String,
    summary: Option<String>,
    category: String,
    tags: Option<String>,
    is_published: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = blog_posts)]
struct BlogPostChangeset {
    title: Option<String>,
    content: Option<String>,
    summary: Option<Option<String>>,
    category: Option<String>,
    tags: Option<Option<String>>,
    is_published: Option<bool>,
    updated_at: NaiveDateTime,
}

fn encode_tags(tags: &Option<Vec<String>>) -> Result<Option<String>, DomainError> {
    tags.as_ref()
        .map(|t| serde_json::to_string(t))
        .transpose()
        .map_err(|e| DomainError::Repository(format!("Failed to encode tags: {}", e)))
}

fn decode_tags(tags: Option<String>) -> Result<Option<Vec<String>>, DomainError> {
    tags.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(|e| DomainError::Repository(format!("Corrupt tags column: {}", e)))
}

impl TryFrom<BlogPostModel> for BlogPost {
    type Error = DomainError;

    fn try_from(model: BlogPostModel) -> Result<Self, Self::Error> {
        Ok(BlogPost {
            id: model.id,
            title: model.title,
            content: model.content,
            summary: model.summary,
            category: model.category,
            tags: decode_tags(model.tags)?,
            is_published: model.is_published,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

impl TryFrom<&BlogPost> for BlogPostModel {
    type Error = DomainError;

    fn try_from(post: &BlogPost) -> Result<Self, Self::Error> {
        Ok(BlogPostModel {
            id: post.id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            summary: post.summary.clone(),
            category: post.category.clone(),
            tags: encode_tags(&post.tags)?,
            is_published: post.is_published,
            created_at: post.created_at.naive_utc(),
            updated_at: post.updated_at.naive_utc(),
        })
    }
}

impl BlogPostChangeset {
    fn new(changes: BlogPostChanges, now: NaiveDateTime) -> Result<Self, DomainError> {
        let tags = match changes.tags {
            Some(tags) => Some(encode_tags(&tags)?),
            None => None,
        };
        Ok(Self {
            title: changes.title,
            content: changes.content,
            summary: changes.summary,
            category: changes.category,
            tags,
            is_published: changes.is_published,
            updated_at: now,
        })
    }
}

pub struct SqliteBlogPostRepository {
    pool: SqlitePool,
}

impl SqliteBlogPostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogPostRepository for SqliteBlogPostRepository {
    async fn find_all(&self) -> Result<Vec<BlogPost>, DomainError> {
        let rows = with_connection(&self.pool, |conn| {
            blog_posts::table
                .order(blog_posts::created_at.desc())
                .select(BlogPostModel::as_select())
                .load::<BlogPostModel>(conn)
        })
        .await?;

        rows.into_iter().map(BlogPost::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BlogPost>, DomainError> {
        let id = id.to_string();
        let row = with_connection(&self.pool, move |conn| {
            blog_posts::table
                .filter(blog_posts::id.eq(id))
                .select(BlogPostModel::as_select())
                .first::<BlogPostModel>(conn)
                .optional()
        })
        .await?;

        row.map(BlogPost::try_from).transpose()
    }

    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, DomainError> {
        let post = BlogPost::create(post, Utc::now());
        let model = BlogPostModel::try_from(&post)?;

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(blog_posts::table)
                .values(&model)
                .execute(conn)
        })
        .await?;

        debug!("Created blog post {}", post.id);
        Ok(post)
    }

    async fn update(
        &self,
        id: &str,
        changes: BlogPostChanges,
    ) -> Result<Option<BlogPost>, DomainError> {
        let id = id.to_string();
        let changeset = BlogPostChangeset::new(changes, Utc::now().naive_utc())?;

        let row = with_connection(&self.pool, move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let updated = diesel::update(blog_posts::table.filter(blog_posts::id.eq(&id)))
                    .set(&changeset)
                    .execute(conn)?;
                if updated == 0 {
                    return Ok(None);
                }

                // Fetch the updated post
                blog_posts::table
                    .filter(blog_posts::id.eq(&id))
                    .select(BlogPostModel::as_select())
                    .first::<BlogPostModel>(conn)
                    .optional()
            })
        })
        .await?;

        row.map(BlogPost::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let id = id.to_string();
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(blog_posts::table.filter(blog_posts::id.eq(id))).execute(conn)
        })
        .await?;

        Ok(deleted > 0)
    }
}
