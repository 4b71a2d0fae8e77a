use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use domain::DomainError;
use tracing::info;

pub mod schema;
pub use schema::*;

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Per-connection pragmas. Writers wait on a locked database instead of failing.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", self.busy_timeout_ms))
            .map_err(r2d2::Error::QueryError)
    }
}

pub struct Database {
    pool: SqlitePool,
}

/// Accepts plain paths as well as `sqlite://` / `sqlite:` prefixed URLs.
fn normalize_url(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

impl Database {
    /// Open the pool and make sure both tables exist.
    pub fn connect(database_url: &str) -> Result<Self, DomainError> {
        let path = normalize_url(database_url);
        // Every connection to `:memory:` is a separate database.
        let max_size = if path == ":memory:" { 1 } else { 8 };

        let manager = ConnectionManager::<SqliteConnection>::new(path);
        let pool = r2d2::Pool::builder()
            .max_size(max_size)
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout_ms: BUSY_TIMEOUT_MS,
            }))
            .build(manager)
            .map_err(|e| DomainError::Repository(format!("Failed to open {}: {}", path, e)))?;

        let mut conn = pool
            .get()
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        conn.batch_execute(CREATE_TABLES)
            .map_err(|e| DomainError::Repository(format!("Failed to create tables: {}", e)))?;
        info!("SQLite store ready at {}", path);

        Ok(Database { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Run a blocking diesel call on the blocking thread pool.
pub(crate) async fn with_connection<T, F>(pool: &SqlitePool, f: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        f(&mut conn).map_err(|e| DomainError::Repository(e.to_string()))
    })
    .await
    .map_err(|e| DomainError::Repository(e.to_string()))?
}
