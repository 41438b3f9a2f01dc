use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use wasabi::db::PgGateway;

/// A dedicated, freshly migrated database for one test.
pub struct TestDb {
    pub pool: PgPool,
    pub gateway: Arc<PgGateway>,
    pub db_name: String,
    admin_url: String,
}

fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok()
}

fn with_db(base_url: &str, db_name: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Create a unique test database, or `None` when `DATABASE_URL` is unset.
pub async fn spawn_db() -> Option<TestDb> {
    let Some(base_url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let db_name = format!("wasabi_test_{}", Uuid::now_v7().to_string().replace('-', ""));
    let admin_url = with_db(&base_url, "postgres");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&with_db(&base_url, &db_name))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    Some(TestDb {
        gateway: Arc::new(PgGateway::new(pool.clone())),
        pool,
        db_name,
        admin_url,
    })
}

/// Drop the test database.
pub async fn cleanup(db: TestDb) {
    db.pool.close().await;

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db.admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", db.db_name))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
