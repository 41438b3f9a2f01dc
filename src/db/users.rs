use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{NewUser, User, UserDto, UserFields, UserFilter};

pub async fn create(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password, role, is_active)
         VALUES ($1, $2, $3, FALSE) RETURNING *",
    )
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.role)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_dto_by_id(pool: &PgPool, id: i64) -> Result<Option<UserDto>, sqlx::Error> {
    sqlx::query_as::<_, UserDto>("SELECT id, username, role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_dto_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserDto>, sqlx::Error> {
    sqlx::query_as::<_, UserDto>("SELECT id, username, role FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Search with every supplied filter ANDed together.
pub async fn search(pool: &PgPool, filter: &UserFilter) -> Result<Vec<UserDto>, sqlx::Error> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT id, username, role FROM users WHERE TRUE");

    if let Some(id) = filter.user_id() {
        query.push(" AND id = ").push_bind(id);
    }
    if let Some(username) = filter.username() {
        query.push(" AND username = ").push_bind(username.to_string());
    }
    if let Some(role) = filter.role() {
        query.push(" AND role = ").push_bind(role.to_string());
    }
    query.push(" ORDER BY id ASC");

    query.build_query_as::<UserDto>().fetch_all(pool).await
}

/// Write the full field set in one statement. `None` means no row has `id`.
pub async fn update_fields(
    pool: &PgPool,
    id: i64,
    fields: &UserFields,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET username = $2, is_active = $3, role = $4
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&fields.username)
    .bind(fields.is_active)
    .bind(&fields.role)
    .fetch_optional(pool)
    .await
}
