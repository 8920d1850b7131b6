//! Book repository for database operations.
//!
//! Implements book CRUD operations using SeaORM.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::{attachments, books, users};
use crate::repositories::attachment::AttachmentMeta;
use bookcrossing_core::attachment::AttachmentInfo;
use bookcrossing_core::book::{
    Book, BookError, BookInput, BookQuery, BookRepository as BookRepoTrait,
};

/// Book repository implementation.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: DatabaseConnection,
}

impl BookRepository {
    /// Create a new book repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, select: Select<books::Entity>) -> Result<Vec<Book>, DbErr> {
        let models = select
            .order_by_asc(books::Column::Id)
            .all(&self.db)
            .await?;
        with_attachments(&self.db, models).await
    }
}

impl BookRepoTrait for BookRepository {
    async fn find_user_id(&self, login: &str) -> Result<Option<i32>, BookError> {
        users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Login.eq(login))
            .into_tuple::<i32>()
            .one(&self.db)
            .await
            .map_err(BookError::repository)
    }

    async fn create(&self, owner_id: i32, input: BookInput) -> Result<Book, BookError> {
        let active_model = books::ActiveModel {
            owner_id: Set(owner_id),
            title: Set(input.title),
            author: Set(input.author),
            genre: Set(input.genre),
            description: Set(input.description),
            publishing_house: Set(input.publishing_house),
            year_of_publishing: Set(input.year_of_publishing),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(BookError::repository)?;

        Ok(to_domain(model, None))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, BookError> {
        let books = self
            .load(books::Entity::find_by_id(id))
            .await
            .map_err(BookError::repository)?;

        Ok(books.into_iter().next())
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Book>, BookError> {
        self.load(books::Entity::find().filter(books::Column::OwnerId.eq(owner_id)))
            .await
            .map_err(BookError::repository)
    }

    async fn list_excluding_owner(
        &self,
        excluded_owner: Option<i32>,
    ) -> Result<Vec<Book>, BookError> {
        let mut select = books::Entity::find();
        if let Some(owner_id) = excluded_owner {
            select = select.filter(books::Column::OwnerId.ne(owner_id));
        }

        self.load(select).await.map_err(BookError::repository)
    }

    async fn search(&self, query: &BookQuery) -> Result<(Vec<Book>, u64), BookError> {
        let mut select = books::Entity::find();
        if let Some(title) = &query.title {
            select = select.filter(books::Column::Title.contains(title));
        }
        if let Some(author) = &query.author {
            select = select.filter(books::Column::Author.contains(author));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(BookError::repository)?;

        let page = self
            .load(
                select
                    .offset(query.page.offset())
                    .limit(query.page.limit()),
            )
            .await
            .map_err(BookError::repository)?;

        Ok((page, total))
    }

    async fn delete(&self, id: i32) -> Result<bool, BookError> {
        let txn = self.db.begin().await.map_err(BookError::repository)?;

        let removed_attachment = attachments::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(BookError::repository)?;

        let result = books::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(BookError::repository)?;

        txn.commit().await.map_err(BookError::repository)?;

        debug!(
            book_id = id,
            attachment_removed = removed_attachment.rows_affected > 0,
            "Book row deleted"
        );

        Ok(result.rows_affected > 0)
    }
}

/// Attach cover metadata to each book, without loading image bytes.
pub(crate) async fn with_attachments<C: ConnectionTrait>(
    db: &C,
    models: Vec<books::Model>,
) -> Result<Vec<Book>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut metas: HashMap<i32, AttachmentInfo> = AttachmentMeta::select()
        .filter(attachments::Column::Id.is_in(ids))
        .into_model::<AttachmentMeta>()
        .all(db)
        .await?
        .into_iter()
        .map(|meta| (meta.id, meta.into()))
        .collect();

    Ok(models
        .into_iter()
        .map(|m| {
            let attachment = metas.remove(&m.id);
            to_domain(m, attachment)
        })
        .collect())
}

/// Convert database model to domain model.
pub(crate) fn to_domain(model: books::Model, attachment: Option<AttachmentInfo>) -> Book {
    Book {
        id: model.id,
        owner_id: model.owner_id,
        title: model.title,
        author: model.author,
        genre: model.genre,
        description: model.description,
        publishing_house: model.publishing_house,
        year_of_publishing: model.year_of_publishing,
        attachment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
