//! Attachment repository for database operations.
//!
//! Images live in the `attachments` table, keyed by book ID.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QuerySelect, Select, Set, TransactionTrait,
};

use crate::entities::{attachments, books, users};
use crate::repositories::book::with_attachments;
use bookcrossing_core::attachment::{
    AttachmentError, AttachmentFile, AttachmentInfo, AttachmentRepository as AttachmentRepoTrait,
    NewAttachment,
};
use bookcrossing_core::book::Book;

/// Attachment columns without the payload.
#[derive(Debug, FromQueryResult)]
pub(crate) struct AttachmentMeta {
    pub id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<FixedOffset>,
}

impl AttachmentMeta {
    pub(crate) fn select() -> Select<attachments::Entity> {
        attachments::Entity::find().select_only().columns([
            attachments::Column::Id,
            attachments::Column::FileName,
            attachments::Column::ContentType,
            attachments::Column::Size,
            attachments::Column::CreatedAt,
        ])
    }
}

impl From<AttachmentMeta> for AttachmentInfo {
    fn from(meta: AttachmentMeta) -> Self {
        Self {
            id: meta.id,
            file_name: meta.file_name,
            content_type: meta.content_type,
            size: meta.size,
            created_at: meta.created_at.with_timezone(&Utc),
        }
    }
}

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttachmentRepoTrait for AttachmentRepository {
    async fn find_owned_book(
        &self,
        book_id: i32,
        login: &str,
    ) -> Result<Option<Book>, AttachmentError> {
        let model = books::Entity::find_by_id(book_id)
            .inner_join(users::Entity)
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
            .map_err(AttachmentError::repository)?;

        let Some(model) = model else {
            return Ok(None);
        };

        let books = with_attachments(&self.db, vec![model])
            .await
            .map_err(AttachmentError::repository)?;

        Ok(books.into_iter().next())
    }

    async fn book_exists(&self, book_id: i32) -> Result<bool, AttachmentError> {
        let count: u64 = books::Entity::find_by_id(book_id)
            .count(&self.db)
            .await
            .map_err(AttachmentError::repository)?;

        Ok(count > 0)
    }

    async fn upsert(&self, attachment: NewAttachment) -> Result<AttachmentInfo, AttachmentError> {
        let size = i64::try_from(attachment.data.len())
            .map_err(|_| AttachmentError::repository("attachment size overflows i64"))?;

        let txn = self.db.begin().await.map_err(AttachmentError::repository)?;

        attachments::Entity::delete_by_id(attachment.book_id)
            .exec(&txn)
            .await
            .map_err(AttachmentError::repository)?;

        let model = attachments::ActiveModel {
            id: Set(attachment.book_id),
            file_name: Set(attachment.file_name),
            content_type: Set(attachment.content_type),
            size: Set(size),
            data: Set(attachment.data),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(AttachmentError::repository)?;

        txn.commit().await.map_err(AttachmentError::repository)?;

        Ok(to_info(&model))
    }

    async fn delete(&self, book_id: i32) -> Result<bool, AttachmentError> {
        let result = attachments::Entity::delete_by_id(book_id)
            .exec(&self.db)
            .await
            .map_err(AttachmentError::repository)?;

        Ok(result.rows_affected > 0)
    }

    async fn find_file(&self, book_id: i32) -> Result<Option<AttachmentFile>, AttachmentError> {
        let model = attachments::Entity::find_by_id(book_id)
            .one(&self.db)
            .await
            .map_err(AttachmentError::repository)?;

        Ok(model.map(|m| AttachmentFile {
            info: to_info(&m),
            data: m.data,
        }))
    }
}

/// Convert database model to domain metadata.
fn to_info(model: &attachments::Model) -> AttachmentInfo {
    AttachmentInfo {
        id: model.id,
        file_name: model.file_name.clone(),
        content_type: model.content_type.clone(),
        size: model.size,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
