//! Email verification repository for database operations.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{email_verification_tokens, users};

/// How long a confirmation link stays valid.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Email verification repository for confirmation tokens.
#[derive(Debug, Clone)]
pub struct EmailVerificationRepository {
    db: DatabaseConnection,
}

impl EmailVerificationRepository {
    /// Creates a new email verification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a verification token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generates a random URL-safe verification token.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    /// Creates a new verification token for a user, invalidating older ones.
    /// Returns the raw token (not hashed) to be sent via email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_token(&self, user_id: i32) -> Result<String, DbErr> {
        let txn = self.db.begin().await?;
        invalidate_tokens(&txn, user_id).await?;
        let raw_token = insert_token(&txn, user_id).await?;
        txn.commit().await?;

        Ok(raw_token)
    }

    /// Consumes a token and enables its user in one transaction.
    ///
    /// Returns `None` if the token is unknown, used or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn verify_token(&self, raw_token: &str) -> Result<Option<users::Model>, DbErr> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let token = email_verification_tokens::Entity::find()
            .filter(email_verification_tokens::Column::TokenHash.eq(Self::hash_token(raw_token)))
            .filter(email_verification_tokens::Column::UsedAt.is_null())
            .one(&txn)
            .await?;

        let Some(token) = token.filter(|t| t.expires_at.with_timezone(&Utc) > now) else {
            return Ok(None);
        };

        let user_id = token.user_id;
        let mut token_active: email_verification_tokens::ActiveModel = token.into();
        token_active.used_at = Set(Some(now.into()));
        token_active.update(&txn).await?;

        let Some(user) = users::Entity::find_by_id(user_id).one(&txn).await? else {
            return Ok(None);
        };

        let mut user_active: users::ActiveModel = user.into();
        user_active.enabled = Set(true);
        user_active.updated_at = Set(now.into());
        let updated_user = user_active.update(&txn).await?;

        txn.commit().await?;

        Ok(Some(updated_user))
    }

    /// Invalidates all existing tokens for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn invalidate_user_tokens(&self, user_id: i32) -> Result<u64, DbErr> {
        invalidate_tokens(&self.db, user_id).await
    }
}

/// Stores a fresh token for `user_id` on `db` and returns the raw value.
pub(crate) async fn insert_token<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<String, DbErr> {
    let raw_token = EmailVerificationRepository::generate_token();
    let now = Utc::now();

    email_verification_tokens::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token_hash: Set(EmailVerificationRepository::hash_token(&raw_token)),
        expires_at: Set((now + Duration::hours(TOKEN_TTL_HOURS)).into()),
        used_at: Set(None),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    Ok(raw_token)
}

async fn invalidate_tokens<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

    let result = email_verification_tokens::Entity::update_many()
        .col_expr(
            email_verification_tokens::Column::UsedAt,
            sea_orm::sea_query::Expr::value(now),
        )
        .filter(email_verification_tokens::Column::UserId.eq(user_id))
        .filter(email_verification_tokens::Column::UsedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let hash = EmailVerificationRepository::hash_token("token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, EmailVerificationRepository::hash_token("token"));
        assert_ne!(hash, EmailVerificationRepository::hash_token("other"));
    }

    #[test]
    fn test_generated_tokens_are_url_safe_and_unique() {
        let a = EmailVerificationRepository::generate_token();
        let b = EmailVerificationRepository::generate_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
