//! Shared setup for repository integration tests.

use bookcrossing_core::user::{NewUser, UserRepository as _};
use bookcrossing_db::{Migrator, UserRepository, connect};
use bookcrossing_shared::config::DatabaseConfig;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with all migrations applied.
pub async fn setup() -> DatabaseConnection {
    let db = connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to connect to database");

    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Inserts a disabled user and returns its ID.
pub async fn create_user(db: &DatabaseConnection, login: &str) -> i32 {
    UserRepository::new(db.clone())
        .create(NewUser {
            login: login.to_string(),
            name: login.to_string(),
            email: format!("{login}@example.com"),
            city: None,
            password_hash: "$argon2id$test_hash".to_string(),
        })
        .await
        .expect("Failed to create user")
        .user
        .id
}
