use chrono::{DateTime, Utc};
use sqlx::{Database, Encode, FromRow, PgPool, Postgres, QueryBuilder, Sqlite, SqlitePool, Type};
use tick_api::v1::Todo;

/// The SQL that differs between the supported databases.
#[derive(Debug)]
struct Dialect {
    create_table: &'static str,
    columns: &'static str,
}

const SQLITE: Dialect = Dialect {
    create_table: "
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    ",
    columns: "id, text, completed, created_at, updated_at",
};

// Tables made by older deployments use SERIAL and TIMESTAMP columns, the
// casts let both shapes decode into `Todo`.
const POSTGRES: Dialect = Dialect {
    create_table: "
        CREATE TABLE IF NOT EXISTS todos (
            id BIGSERIAL PRIMARY KEY,
            text TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    ",
    columns: "id::BIGINT AS id, text, completed, \
              created_at::TIMESTAMPTZ AS created_at, updated_at::TIMESTAMPTZ AS updated_at",
};

/// Which database a connection string points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, sqlx::Error> {
        let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);

        match scheme {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(sqlx::Error::Configuration(
                format!("unsupported database url scheme `{scheme}`, expected sqlite or postgres")
                    .into(),
            )),
        }
    }

    fn dialect(self) -> &'static Dialect {
        match self {
            Self::Sqlite => &SQLITE,
            Self::Postgres => &POSTGRES,
        }
    }
}

#[derive(Clone, Debug)]
enum Pool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Handle to the `todos` table.
///
/// Cloning is cheap, all clones share one connection pool. Every operation is
/// a single statement, so concurrent writers to the same row are resolved by
/// the database: the last committed write wins, and an update that loses a
/// race against a delete finds no row.
#[derive(Clone, Debug)]
pub struct TodoStore {
    pool: Pool,
}

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TodoStore {
    /// Connects to SQLite (`sqlite:`) or PostgreSQL (`postgres://`).
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = match Backend::from_url(url)? {
            Backend::Sqlite => Pool::Sqlite(SqlitePool::connect(url).await?),
            Backend::Postgres => Pool::Postgres(PgPool::connect(url).await?),
        };

        Ok(Self { pool })
    }

    pub fn backend(&self) -> Backend {
        match self.pool {
            Pool::Sqlite(_) => Backend::Sqlite,
            Pool::Postgres(_) => Backend::Postgres,
        }
    }

    fn dialect(&self) -> &'static Dialect {
        self.backend().dialect()
    }

    /// Creates the `todos` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let sql = self.dialect().create_table;

        match &self.pool {
            Pool::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            Pool::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }

        Ok(())
    }

    pub async fn close(&self) {
        match &self.pool {
            Pool::Sqlite(pool) => pool.close().await,
            Pool::Postgres(pool) => pool.close().await,
        }
    }

    /// All todos, newest first.
    pub async fn list(&self) -> Result<Vec<Todo>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM todos ORDER BY created_at DESC, id DESC",
            self.dialect().columns
        );

        let rows = match &self.pool {
            Pool::Sqlite(pool) => sqlx::query_as::<_, TodoRow>(&sql).fetch_all(pool).await?,
            Pool::Postgres(pool) => sqlx::query_as::<_, TodoRow>(&sql).fetch_all(pool).await?,
        };

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// Inserts a new, not yet completed todo. `text` is stored as given.
    pub async fn create(&self, text: &str) -> Result<Todo, sqlx::Error> {
        let now = Utc::now();
        let columns = self.dialect().columns;

        let row = match &self.pool {
            Pool::Sqlite(pool) => {
                (insert_query::<Sqlite>(text, now, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_one(pool)
                    .await?
            }
            Pool::Postgres(pool) => {
                (insert_query::<Postgres>(text, now, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(row.into())
    }

    /// Applies `changes` and refreshes `updated_at`. Returns `None` when no
    /// todo has the given id.
    pub async fn update(
        &self,
        id: i64,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let now = Utc::now();
        let columns = self.dialect().columns;

        let row = match &self.pool {
            Pool::Sqlite(pool) => {
                (changes.query::<Sqlite>(id, now, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_optional(pool)
                    .await?
            }
            Pool::Postgres(pool) => {
                (changes.query::<Postgres>(id, now, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(row.map(Todo::from))
    }

    /// Returns whether a todo was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let columns = self.dialect().columns;

        let row = match &self.pool {
            Pool::Sqlite(pool) => {
                (delete_query::<Sqlite>(id, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_optional(pool)
                    .await?
            }
            Pool::Postgres(pool) => {
                (delete_query::<Postgres>(id, columns))
                    .build_query_as::<TodoRow>()
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(row.is_some())
    }
}

fn insert_query<DB>(text: &str, now: DateTime<Utc>, columns: &str) -> QueryBuilder<'static, DB>
where
    DB: Database,
    String: Encode<'static, DB> + Type<DB>,
    DateTime<Utc>: Encode<'static, DB> + Type<DB>,
{
    let mut query =
        QueryBuilder::new("INSERT INTO todos (text, completed, created_at, updated_at) VALUES (");

    query.push_bind(text.to_owned()).push(", FALSE, ");
    query.push_bind(now).push(", ").push_bind(now);
    query.push(") RETURNING ").push(columns);

    query
}

fn delete_query<DB>(id: i64, columns: &str) -> QueryBuilder<'static, DB>
where
    DB: Database,
    i64: Encode<'static, DB> + Type<DB>,
{
    let mut query = QueryBuilder::new("DELETE FROM todos WHERE id = ");
    query.push_bind(id).push(" RETURNING ").push(columns);

    query
}

/// The set of fields a partial update touches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    text: Option<String>,
    completed: Option<bool>,
}

impl TodoChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }

    fn query<DB>(&self, id: i64, now: DateTime<Utc>, columns: &str) -> QueryBuilder<'static, DB>
    where
        DB: Database,
        String: Encode<'static, DB> + Type<DB>,
        bool: Encode<'static, DB> + Type<DB>,
        i64: Encode<'static, DB> + Type<DB>,
        DateTime<Utc>: Encode<'static, DB> + Type<DB>,
    {
        let mut query = QueryBuilder::new("UPDATE todos SET updated_at = ");
        query.push_bind(now);

        if let Some(text) = &self.text {
            query.push(", text = ").push_bind(text.clone());
        }

        if let Some(completed) = self.completed {
            query.push(", completed = ").push_bind(completed);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING ").push(columns);

        query
    }
}

#[cfg(test)]
impl TodoStore {
    /// Single-connection in-memory store that lives as long as the pool.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self {
            pool: Pool::Sqlite(pool),
        };
        store.init_schema().await?;

        Ok(store)
    }

    pub async fn count(&self) -> i64 {
        let sql = "SELECT COUNT(*) FROM todos";

        match &self.pool {
            Pool::Sqlite(pool) => sqlx::query_scalar(sql).fetch_one(pool).await.unwrap(),
            Pool::Postgres(pool) => sqlx::query_scalar(sql).fetch_one(pool).await.unwrap(),
        }
    }
}
