pub mod histories;
pub mod memory;
pub mod processes;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{History, NewHistory, NewUser, User, UserDto, UserFields, UserFilter, UserLookup};

pub use memory::MemoryGateway;

/// Failure reported by a [`Gateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    NotFound,
    UniqueViolation(String),
    Other(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::NotFound => write!(f, "record not found"),
            GatewayError::UniqueViolation(msg) => write!(f, "unique constraint violation: {msg}"),
            GatewayError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => GatewayError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                GatewayError::UniqueViolation(db_err.message().to_string())
            }
            other => GatewayError::Other(other.to_string()),
        }
    }
}

/// Narrow persistence boundary used by the user service and the purger.
///
/// Implementations hold no domain logic: conflicts are reported by the
/// store's own uniqueness constraint, never by a pre-check.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> Result<User, GatewayError>;

    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<User, GatewayError>;

    /// Same as `find_user`, but only reads the projected columns.
    async fn find_user_dto(&self, lookup: UserLookup<'_>) -> Result<UserDto, GatewayError>;

    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<UserDto>, GatewayError>;

    /// Writes every field of `fields` and returns the stored row.
    async fn update_user(&self, id: i64, fields: &UserFields) -> Result<User, GatewayError>;

    async fn insert_process(&self, name: &str) -> Result<i64, GatewayError>;

    async fn insert_history(&self, history: &NewHistory) -> Result<History, GatewayError>;

    async fn find_histories(&self, process_id: i64) -> Result<Vec<History>, GatewayError>;

    /// Removes every history row created before `cutoff` in one
    /// statement. Zero rows is `Ok(0)`.
    async fn delete_histories_before(&self, cutoff: DateTime<Utc>) -> Result<u64, GatewayError>;
}

/// Postgres-backed gateway over a shared sqlx pool.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn insert_user(&self, user: &NewUser) -> Result<User, GatewayError> {
        Ok(users::create(&self.pool, user).await?)
    }

    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<User, GatewayError> {
        let user = match lookup {
            UserLookup::Id(id) => users::find_by_id(&self.pool, id).await?,
            UserLookup::Username(username) => users::find_by_username(&self.pool, username).await?,
        };
        user.ok_or(GatewayError::NotFound)
    }

    async fn find_user_dto(&self, lookup: UserLookup<'_>) -> Result<UserDto, GatewayError> {
        let user = match lookup {
            UserLookup::Id(id) => users::find_dto_by_id(&self.pool, id).await?,
            UserLookup::Username(username) => {
                users::find_dto_by_username(&self.pool, username).await?
            }
        };
        user.ok_or(GatewayError::NotFound)
    }

    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<UserDto>, GatewayError> {
        Ok(users::search(&self.pool, filter).await?)
    }

    async fn update_user(&self, id: i64, fields: &UserFields) -> Result<User, GatewayError> {
        users::update_fields(&self.pool, id, fields)
            .await?
            .ok_or(GatewayError::NotFound)
    }

    async fn insert_process(&self, name: &str) -> Result<i64, GatewayError> {
        Ok(processes::create(&self.pool, name).await?)
    }

    async fn insert_history(&self, history: &NewHistory) -> Result<History, GatewayError> {
        Ok(histories::create(&self.pool, history).await?)
    }

    async fn find_histories(&self, process_id: i64) -> Result<Vec<History>, GatewayError> {
        Ok(histories::list_by_process(&self.pool, process_id).await?)
    }

    async fn delete_histories_before(&self, cutoff: DateTime<Utc>) -> Result<u64, GatewayError> {
        Ok(histories::delete_before(&self.pool, cutoff).await?)
    }
}
