// Database schema for the portfolio content store
diesel::table! {
    blog_posts (id) {
        id -> Text,                // UUID v4
        title -> Text,
        content -> Text,
        summary -> Nullable<Text>,
        category -> Text,
        tags -> Nullable<Text>,    // JSON array of strings
        is_published -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    learning_resources (id) {
        id -> Text,
        title -> Text,
        description -> Text,
        file_name -> Text,         // Generated name inside the upload directory
        file_size -> BigInt,       // Bytes
        file_type -> Text,         // MIME type
        category -> Text,          // 어린이용, 어르신용
        resource_type -> Text,     // 활동지, 동영상, 게임, 안내서
        difficulty -> Text,        // 쉬움, 보통, 어려움
        age_group -> Text,
        download_count -> BigInt,
        is_active -> Bool,         // false = soft deleted
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(blog_posts, learning_resources,);

/// DDL applied on connect.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS blog_posts (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    summary TEXT,
    category TEXT NOT NULL DEFAULT '교육경험',
    tags TEXT,
    is_published BOOLEAN NOT NULL DEFAULT 1,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_blog_posts_created_at ON blog_posts (created_at);

CREATE TABLE IF NOT EXISTS learning_resources (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_size BIGINT NOT NULL,
    file_type TEXT NOT NULL,
    category TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    age_group TEXT NOT NULL,
    download_count BIGINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_learning_resources_active_created
    ON learning_resources (is_active, created_at);
"#;
