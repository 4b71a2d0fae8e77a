use crate::validation::{CreateMode, FieldReader, Label, Presence, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Audience a resource is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceCategory {
    #[serde(rename = "어린이용")]
    Children,
    #[serde(rename = "어르신용")]
    Seniors,
}

impl Label for ResourceCategory {
    const ALL: &'static [Self] = &[Self::Children, Self::Seniors];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Children => "어린이용",
            Self::Seniors => "어르신용",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "활동지")]
    Worksheet,
    #[serde(rename = "동영상")]
    Video,
    #[serde(rename = "게임")]
    Game,
    #[serde(rename = "안내서")]
    Guide,
}

impl Label for ResourceType {
    const ALL: &'static [Self] = &[Self::Worksheet, Self::Video, Self::Game, Self::Guide];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Worksheet => "활동지",
            Self::Video => "동영상",
            Self::Game => "게임",
            Self::Guide => "안내서",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "쉬움")]
    Easy,
    #[serde(rename = "보통")]
    Medium,
    #[serde(rename = "어려움")]
    Hard,
}

impl Label for Difficulty {
    const ALL: &'static [Self] = &[Self::Easy, Self::Medium, Self::Hard];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "쉬움",
            Self::Medium => "보통",
            Self::Hard => "어려움",
        }
    }
}

/// Downloadable resource with one attached file. Soft-deleted through `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResource {
    pub id: String,
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub category: ResourceCategory,
    pub resource_type: ResourceType,
    pub difficulty: Difficulty,
    pub age_group: String,
    pub download_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLearningResource {
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub category: ResourceCategory,
    pub resource_type: ResourceType,
    pub difficulty: Difficulty,
    pub age_group: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningResourceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub category: Option<ResourceCategory>,
    pub resource_type: Option<ResourceType>,
    pub difficulty: Option<Difficulty>,
    pub age_group: Option<String>,
    pub is_active: Option<bool>,
}

impl NewLearningResource {
    pub fn parse(value: &Value, mode: CreateMode) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new(value)?;
        let required = Presence::Required;

        let title = reader.text("title", required, true);
        let description = reader.text("description", required, true);
        let file_name = reader.text("fileName", required, true);
        let file_size = reader.integer("fileSize", required, 0);
        let file_type = reader.text("fileType", required, true);
        let category = reader.label("category", required);
        let resource_type = reader.label("resourceType", required);
        let difficulty = reader.label("difficulty", required);
        let age_group = reader.text("ageGroup", required, true);
        let is_active = reader.boolean("isActive", Presence::defaulted(mode));
        reader.finish()?;

        match (
            title,
            description,
            file_name,
            file_size,
            file_type,
            category,
            resource_type,
            difficulty,
            age_group,
        ) {
            (
                Some(title),
                Some(description),
                Some(file_name),
                Some(file_size),
                Some(file_type),
                Some(category),
                Some(resource_type),
                Some(difficulty),
                Some(age_group),
            ) => Ok(Self {
                title,
                description,
                file_name,
                file_size,
                file_type,
                category,
                resource_type,
                difficulty,
                age_group,
                is_active,
            }),
            _ => Err(ValidationErrors::single("", "Required fields missing")),
        }
    }
}

impl LearningResourceChanges {
    pub fn parse(value: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new(value)?;
        let optional = Presence::Optional;
        let changes = Self {
            title: reader.text("title", optional, true),
            description: reader.text("description", optional, true),
            file_name: reader.text("fileName", optional, true),
            file_size: reader.integer("fileSize", optional, 0),
            file_type: reader.text("fileType", optional, true),
            category: reader.label("category", optional),
            resource_type: reader.label("resourceType", optional),
            difficulty: reader.label("difficulty", optional),
            age_group: reader.text("ageGroup", optional, true),
            is_active: reader.boolean("isActive", optional),
        };
        reader.finish()?;
        Ok(changes)
    }
}

impl LearningResource {
    pub fn create(input: NewLearningResource, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            file_name: input.file_name,
            file_size: input.file_size,
            file_type: input.file_type,
            category: input.category,
            resource_type: input.resource_type,
            difficulty: input.difficulty,
            age_group: input.age_group,
            download_count: 0,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: LearningResourceChanges, now: DateTime<Utc>) {
        if let Some(v) = changes.title {
            self.title = v;
        }
        if let Some(v) = changes.description {
            self.description = v;
        }
        if let Some(v) = changes.file_name {
            self.file_name = v;
        }
        if let Some(v) = changes.file_size {
            self.file_size = v;
        }
        if let Some(v) = changes.file_type {
            self.file_type = v;
        }
        if let Some(v) = changes.category {
            self.category = v;
        }
        if let Some(v) = changes.resource_type {
            self.resource_type = v;
        }
        if let Some(v) = changes.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = changes.age_group {
            self.age_group = v;
        }
        if let Some(v) = changes.is_active {
            self.is_active = v;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "title": "숫자 놀이",
            "description": "Counting worksheet",
            "fileName": "count.pdf",
            "fileSize": 1024,
            "fileType": "application/pdf",
            "category": "어린이용",
            "resourceType": "활동지",
            "difficulty": "쉬움",
            "ageGroup": "5-7세"
        })
    }

    #[test]
    fn relaxed_create_defaults_is_active() {
        let input = NewLearningResource::parse(&payload(), CreateMode::Relaxed).unwrap();
        let resource = LearningResource::create(input, Utc::now());

        assert!(resource.is_active);
        assert_eq!(resource.download_count, 0);
        assert_eq!(resource.category, ResourceCategory::Children);
        assert_eq!(resource.created_at, resource.updated_at);
    }

    #[test]
    fn strict_create_requires_is_active() {
        let errors = NewLearningResource::parse(&payload(), CreateMode::Strict).unwrap_err();
        assert!(errors.has_path("isActive"));
    }

    #[test]
    fn rejects_unknown_labels_and_negative_sizes() {
        let mut body = payload();
        body["category"] = json!("teenagers");
        body["difficulty"] = json!("impossible");
        body["fileSize"] = json!(-5);
        let errors = NewLearningResource::parse(&body, CreateMode::Relaxed).unwrap_err();

        assert!(errors.has_path("category"));
        assert!(errors.has_path("difficulty"));
        assert!(errors.has_path("fileSize"));
        assert!(!errors.has_path("resourceType"));
    }

    #[test]
    fn download_count_is_not_accepted_from_input() {
        let mut body = payload();
        body["downloadCount"] = json!(99);
        let input = NewLearningResource::parse(&body, CreateMode::Relaxed).unwrap();
        assert_eq!(LearningResource::create(input, Utc::now()).download_count, 0);
    }

    #[test]
    fn changes_reject_null_for_required_columns() {
        let errors = LearningResourceChanges::parse(&json!({"title": null})).unwrap_err();
        assert!(errors.has_path("title"));

        let changes = LearningResourceChanges::parse(&json!({"difficulty": "어려움"})).unwrap();
        assert_eq!(changes.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn labels_round_trip_through_serde() {
        for ty in ResourceType::ALL {
            let encoded = serde_json::to_value(ty).unwrap();
            assert_eq!(encoded, json!(ty.as_str()));
        }
    }
}
