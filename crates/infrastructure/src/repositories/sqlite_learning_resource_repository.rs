use crate::database::{learning_resources, with_connection, SqlitePool};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use domain::validation::Label;
use domain::{
    DomainError, LearningResource, LearningResourceChanges, LearningResourceRepository,
    NewLearningResource,
};
use tracing::debug;

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = learning_resources)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct LearningResourceModel {
    id: String,
    title: String,
    description: String,
    file_name: String,
    file_size: i64,
    file_type: String,
    category: String,
    resource_type: String,
    difficulty: String,
    age_group: String,
    download_count: i64,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = learning_resources)]
struct LearningResourceChangeset {
    title: Option<String>,
    description: Option<String>,
    file_name: Option<String>,
    file_size: Option<i64>,
    file_type: Option<String>,
    category: Option<String>,
    resource_type: Option<String>,
    difficulty: Option<String>,
    age_group: Option<String>,
    is_active: Option<bool>,
    updated_at: NaiveDateTime,
}

fn decode_label<T: Label>(column: &str, value: &str) -> Result<T, DomainError> {
    T::from_label(value).ok_or_else(|| {
        DomainError::Repository(format!("Unknown {} value in store: {}", column, value))
    })
}

impl TryFrom<LearningResourceModel> for LearningResource {
    type Error = DomainError;

    fn try_from(model: LearningResourceModel) -> Result<Self, Self::Error> {
        Ok(LearningResource {
            category: decode_label("category", &model.category)?,
            resource_type: decode_label("resource_type", &model.resource_type)?,
            difficulty: decode_label("difficulty", &model.difficulty)?,
            id: model.id,
            title: model.title,
            description: model.description,
            file_name: model.file_name,
            file_size: model.file_size,
            file_type: model.file_type,
            age_group: model.age_group,
            download_count: model.download_count,
            is_active: model.is_active,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

impl From<&LearningResource> for LearningResourceModel {
    fn from(resource: &LearningResource) -> Self {
        LearningResourceModel {
            id: resource.id.clone(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            file_name: resource.file_name.clone(),
            file_size: resource.file_size,
            file_type: resource.file_type.clone(),
            category: resource.category.as_str().to_string(),
            resource_type: resource.resource_type.as_str().to_string(),
            difficulty: resource.difficulty.as_str().to_string(),
            age_group: resource.age_group.clone(),
            download_count: resource.download_count,
            is_active: resource.is_active,
            created_at: resource.created_at.naive_utc(),
            updated_at: resource.updated_at.naive_utc(),
        }
    }
}

impl LearningResourceChangeset {
    fn new(changes: LearningResourceChanges, now: NaiveDateTime) -> Self {
        Self {
            title: changes.title,
            description: changes.description,
            file_name: changes.file_name,
            file_size: changes.file_size,
            file_type: changes.file_type,
            category: changes.category.map(|c| c.as_str().to_string()),
            resource_type: changes.resource_type.map(|t| t.as_str().to_string()),
            difficulty: changes.difficulty.map(|d| d.as_str().to_string()),
            age_group: changes.age_group,
            is_active: changes.is_active,
            updated_at: now,
        }
    }
}

pub struct SqliteLearningResourceRepository {
    pool: SqlitePool,
}

impl SqliteLearningResourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_row(
        &self,
        id: &str,
        active_only: bool,
    ) -> Result<Option<LearningResource>, DomainError> {
        let id = id.to_string();
        let row = with_connection(&self.pool, move |conn| {
            let mut query = learning_resources::table
                .filter(learning_resources::id.eq(id))
                .into_boxed();
            if active_only {
                query = query.filter(learning_resources::is_active.eq(true));
            }
            query
                .select(LearningResourceModel::as_select())
                .first::<LearningResourceModel>(conn)
                .optional()
        })
        .await?;

        row.map(LearningResource::try_from).transpose()
    }
}

#[async_trait]
impl LearningResourceRepository for SqliteLearningResourceRepository {
    async fn find_active(&self) -> Result<Vec<LearningResource>, DomainError> {
        let rows = with_connection(&self.pool, |conn| {
            learning_resources::table
                .filter(learning_resources::is_active.eq(true))
                .order(learning_resources::created_at.desc())
                .select(LearningResourceModel::as_select())
                .load::<LearningResourceModel>(conn)
        })
        .await?;

        rows.into_iter().map(LearningResource::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LearningResource>, DomainError> {
        self.find_row(id, true).await
    }

    async fn find_by_id_including_inactive(
        &self,
        id: &str,
    ) -> Result<Option<LearningResource>, DomainError> {
        self.find_row(id, false).await
    }

    async fn create(&self, resource: NewLearningResource) -> Result<LearningResource, DomainError> {
        let resource = LearningResource::create(resource, Utc::now());
        let model = LearningResourceModel::from(&resource);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(learning_resources::table)
                .values(&model)
                .execute(conn)
        })
        .await?;

        debug!("Created learning resource {} ({})", resource.id, resource.file_name);
        Ok(resource)
    }

    async fn update(
        &self,
        id: &str,
        changes: LearningResourceChanges,
    ) -> Result<Option<LearningResource>, DomainError> {
        let id = id.to_string();
        let changeset = LearningResourceChangeset::new(changes, Utc::now().naive_utc());

        let row = with_connection(&self.pool, move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let updated = diesel::update(
                    learning_resources::table
                        .filter(learning_resources::id.eq(&id))
                        .filter(learning_resources::is_active.eq(true)),
                )
                .set(&changeset)
                .execute(conn)?;
                if updated == 0 {
                    return Ok(None);
                }

                learning_resources::table
                    .filter(learning_resources::id.eq(&id))
                    .select(LearningResourceModel::as_select())
                    .first::<LearningResourceModel>(conn)
                    .optional()
            })
        })
        .await?;

        row.map(LearningResource::try_from).transpose()
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DomainError> {
        let id = id.to_string();
        let now = Utc::now().naive_utc();
        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(
                learning_resources::table
                    .filter(learning_resources::id.eq(id))
                    .filter(learning_resources::is_active.eq(true)),
            )
            .set((
                learning_resources::is_active.eq(false),
                learning_resources::updated_at.eq(now),
            ))
            .execute(conn)
        })
        .await?;

        Ok(updated > 0)
    }

    async fn increment_download_count(&self, id: &str) -> Result<(), DomainError> {
        let id = id.to_string();
        let now = Utc::now().naive_utc();
        // Single UPDATE so concurrent downloads cannot lose increments
        with_connection(&self.pool, move |conn| {
            diesel::update(
                learning_resources::table
                    .filter(learning_resources::id.eq(id))
                    .filter(learning_resources::is_active.eq(true)),
            )
            .set((
                learning_resources::download_count.eq(learning_resources::download_count + 1),
                learning_resources::updated_at.eq(now),
            ))
            .execute(conn)
        })
        .await?;

        Ok(())
    }
}
