//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};

use crate::entities::users;
use crate::repositories::EmailVerificationRepository;
use crate::repositories::email_verification::insert_token;
use bookcrossing_core::user::{
    NewUser, Registered, User, UserError, UserRepository as UserRepoTrait,
};

/// User repository implementation.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
    }

    /// Inserts a user with the given enabled flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert(&self, user: NewUser, enabled: bool) -> Result<users::Model, DbErr> {
        insert_user(&self.db, user, enabled).await
    }
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    user: NewUser,
    enabled: bool,
) -> Result<users::Model, DbErr> {
    let now = Utc::now().into();
    users::ActiveModel {
        login: Set(user.login),
        name: Set(user.name),
        email: Set(user.email),
        city: Set(user.city),
        password_hash: Set(user.password_hash),
        enabled: Set(enabled),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// A unique violation on insert means a concurrent registration won the race.
fn insert_error(err: DbErr) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            UserError::EmailTaken
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::LoginTaken,
        _ => UserError::repository(err),
    }
}

impl UserRepoTrait for UserRepository {
    async fn login_exists(&self, login: &str) -> Result<bool, UserError> {
        let count = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .count(&self.db)
            .await
            .map_err(UserError::repository)?;

        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(UserError::repository)?;

        Ok(count > 0)
    }

    async fn create(&self, user: NewUser) -> Result<Registered, UserError> {
        let txn = self.db.begin().await.map_err(UserError::repository)?;

        let model = insert_user(&txn, user, false).await.map_err(insert_error)?;
        let confirmation_token = insert_token(&txn, model.id)
            .await
            .map_err(UserError::repository)?;

        txn.commit().await.map_err(UserError::repository)?;

        Ok(Registered {
            user: to_domain(model),
            confirmation_token,
        })
    }

    async fn find_credentials(&self, login: &str) -> Result<Option<(User, String)>, UserError> {
        let model = self
            .find_by_login(login)
            .await
            .map_err(UserError::repository)?;

        Ok(model.map(|m| {
            let hash = m.password_hash.clone();
            (to_domain(m), hash)
        }))
    }

    async fn confirm(&self, raw_token: &str) -> Result<Option<User>, UserError> {
        EmailVerificationRepository::new(self.db.clone())
            .verify_token(raw_token)
            .await
            .map(|user| user.map(to_domain))
            .map_err(UserError::repository)
    }
}

/// Convert database model to domain model.
fn to_domain(model: users::Model) -> User {
    User {
        id: model.id,
        login: model.login,
        name: model.name,
        email: model.email,
        city: model.city,
        enabled: model.enabled,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
