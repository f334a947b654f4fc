//! Book use-case orchestrator.
//!
//! Wraps every repository call in a fixed deadline and, on success, stages
//! exactly one notification event per affected record in the outbox. For
//! mutations the outbox enqueue shares the transaction of the write, so a
//! committed change always has its event staged; for reads the enqueue is
//! logged-and-forgotten so the notification path can never fail a read.
//! The outbox dispatcher picks the staged rows up asynchronously.

use std::future::Future;
use std::time::Duration;

use libris_core::error::CoreError;
use libris_core::types::DbId;
use libris_db::models::book::{Book, BookInput, BookWithAuthor};
use libris_db::repositories::{AuthorRepo, BookRepo, OutboxRepo};
use libris_db::DbPool;
use libris_events::EventType;

use crate::error::{AppError, AppResult};

/// Fallback page size when the caller passes no (or a non-positive) limit.
const DEFAULT_FETCH_LIMIT: i64 = 10;

/// Deadline-bounded orchestrator over the book and author repositories.
pub struct BookUsecase {
    pool: DbPool,
    deadline: Duration,
}

impl BookUsecase {
    /// Create an orchestrator with a fixed per-call deadline.
    pub fn new(pool: DbPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// List books and stage one Fetch event per returned record.
    pub async fn fetch(&self, limit: i64, offset: i64) -> AppResult<Vec<Book>> {
        self.bounded("fetch", async {
            let limit = if limit <= 0 { DEFAULT_FETCH_LIMIT } else { limit };
            let offset = offset.max(0);

            let books = BookRepo::fetch(&self.pool, limit, offset).await?;

            for book in &books {
                self.stage_event_logged(EventType::Fetch, &book.content).await;
            }

            Ok(books)
        })
        .await
    }

    /// Create a book.
    ///
    /// A client-supplied id that already resolves is a conflict and never
    /// reaches the insert path.
    pub async fn add(&self, input: BookInput) -> AppResult<Book> {
        self.bounded("add", async {
            let mut tx = self.pool.begin().await?;

            if let Some(id) = input.id {
                if BookRepo::get_by_id(&mut *tx, id).await?.is_some() {
                    return Err(AppError::Core(CoreError::Conflict(format!(
                        "book with id {id} already exists"
                    ))));
                }
            }

            let book =
                BookRepo::insert(&mut *tx, &input.title, &input.content, input.author_id).await?;
            OutboxRepo::enqueue(&mut *tx, EventType::Add.routing_key(), &book.content).await?;
            tx.commit().await?;

            tracing::info!(book_id = book.id, "Book created");
            Ok(book)
        })
        .await
    }

    /// Update a book. A missing id is NotFound and performs no mutation.
    pub async fn update(&self, id: DbId, input: BookInput) -> AppResult<Book> {
        self.bounded("update", async {
            let mut tx = self.pool.begin().await?;

            BookRepo::get_by_id(&mut *tx, id)
                .await?
                .ok_or(CoreError::NotFound { entity: "book", id })?;

            let book =
                BookRepo::update(&mut *tx, id, &input.title, &input.content, input.author_id)
                    .await?
                    .ok_or(CoreError::NotFound { entity: "book", id })?;
            OutboxRepo::enqueue(&mut *tx, EventType::Update.routing_key(), &book.content).await?;
            tx.commit().await?;

            tracing::info!(book_id = id, "Book updated");
            Ok(book)
        })
        .await
    }

    /// Delete a book. A missing id is NotFound and performs no mutation.
    ///
    /// The staged event snapshots the content the record had at deletion.
    pub async fn delete(&self, id: DbId) -> AppResult<()> {
        self.bounded("delete", async {
            let mut tx = self.pool.begin().await?;

            let existing = BookRepo::get_by_id(&mut *tx, id)
                .await?
                .ok_or(CoreError::NotFound { entity: "book", id })?;

            BookRepo::delete(&mut *tx, id).await?;
            OutboxRepo::enqueue(&mut *tx, EventType::Delete.routing_key(), &existing.content)
                .await?;
            tx.commit().await?;

            tracing::info!(book_id = id, "Book deleted");
            Ok(())
        })
        .await
    }

    /// Get a book with its author resolved.
    pub async fn get_by_id(&self, id: DbId) -> AppResult<BookWithAuthor> {
        self.bounded("get_by_id", async {
            let book = BookRepo::get_by_id(&self.pool, id)
                .await?
                .ok_or(CoreError::NotFound { entity: "book", id })?;

            let author = AuthorRepo::get_by_id(&self.pool, book.author_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "author",
                    id: book.author_id,
                })?;

            self.stage_event_logged(EventType::GetById, &book.content).await;

            Ok(BookWithAuthor::from_parts(book, author))
        })
        .await
    }

    /// Bound a use-case body with the configured deadline.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Core(CoreError::Timeout { operation })),
        }
    }

    /// Stage an event on the read path, where enqueue failure must never
    /// surface to the caller.
    async fn stage_event_logged(&self, event_type: EventType, content: &str) {
        if let Err(e) =
            OutboxRepo::enqueue(&self.pool, event_type.routing_key(), content).await
        {
            tracing::error!(
                error = %e,
                subject = event_type.routing_key(),
                "Failed to stage notification event"
            );
        }
    }
}
