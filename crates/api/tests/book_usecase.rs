//! Integration tests for the book use-case orchestrator.
//!
//! Verifies the CRUD semantics (existence probes, typed errors, deadlines)
//! and the notification contract: exactly one staged event per affected
//! record, none on failure paths.

use std::time::Duration;

use assert_matches::assert_matches;
use libris_api::error::AppError;
use libris_api::usecase::books::BookUsecase;
use libris_core::error::CoreError;
use libris_core::types::DbId;
use libris_db::models::book::BookInput;
use libris_db::models::outbox::OutboxEvent;
use libris_db::repositories::{AuthorRepo, BookRepo, OutboxRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn usecase(pool: &PgPool) -> BookUsecase {
    BookUsecase::new(pool.clone(), Duration::from_secs(5))
}

fn input(id: Option<DbId>, title: &str, content: &str, author_id: DbId) -> BookInput {
    BookInput {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author_id,
    }
}

async fn seed_author(pool: &PgPool, name: &str) -> DbId {
    AuthorRepo::insert(pool, name).await.unwrap().id
}

async fn staged_events(pool: &PgPool) -> Vec<OutboxEvent> {
    OutboxRepo::list_unpublished(pool, 100).await.unwrap()
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn add_stages_exactly_one_add_event(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;

    let book = usecase(&pool)
        .add(input(None, "Hello", "fresh content", author_id))
        .await
        .unwrap();

    let events = staged_events(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "add.sql");
    assert_eq!(events[0].content, "fresh content");
    assert_eq!(book.content, "fresh content");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn add_on_resolvable_id_is_conflict_with_no_insert_and_no_event(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let existing = BookRepo::insert(&pool, "t", "c", author_id).await.unwrap();

    let err = usecase(&pool)
        .add(input(Some(existing.id), "dup", "dup", author_id))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));

    assert_eq!(BookRepo::fetch(&pool, 10, 0).await.unwrap().len(), 1);
    assert!(staged_events(&pool).await.is_empty());
}

// ---------------------------------------------------------------------------
// Update / Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_stages_exactly_one_update_event(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let book = BookRepo::insert(&pool, "t", "old", author_id).await.unwrap();

    let updated = usecase(&pool)
        .update(book.id, input(None, "t", "new content", author_id))
        .await
        .unwrap();
    assert_eq!(updated.content, "new content");

    let events = staged_events(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "update.sql");
    assert_eq!(events[0].content, "new content");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_missing_book_is_not_found_with_no_event(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;

    let err = usecase(&pool)
        .update(9999, input(None, "t", "c", author_id))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppError::Core(CoreError::NotFound { entity: "book", id: 9999 })
    );
    assert!(staged_events(&pool).await.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_stages_event_with_the_deleted_content(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let book = BookRepo::insert(&pool, "t", "doomed content", author_id)
        .await
        .unwrap();

    usecase(&pool).delete(book.id).await.unwrap();

    assert!(BookRepo::get_by_id(&pool, book.id).await.unwrap().is_none());

    let events = staged_events(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "delete.sql");
    assert_eq!(events[0].content, "doomed content");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_missing_book_is_not_found_with_no_event(pool: PgPool) {
    let err = usecase(&pool).delete(9999).await.unwrap_err();
    assert_matches!(
        err,
        AppError::Core(CoreError::NotFound { entity: "book", id: 9999 })
    );
    assert!(staged_events(&pool).await.is_empty());
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn fetch_stages_one_event_per_returned_record(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    for i in 0..7 {
        BookRepo::insert(&pool, &format!("t{i}"), &format!("c{i}"), author_id)
            .await
            .unwrap();
    }

    let books = usecase(&pool).fetch(5, 0).await.unwrap();
    assert_eq!(books.len(), 5);

    let events = staged_events(&pool).await;
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.subject == "fetch.sql"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fetch_of_empty_table_stages_nothing(pool: PgPool) {
    let books = usecase(&pool).fetch(5, 0).await.unwrap();
    assert!(books.is_empty());
    assert!(staged_events(&pool).await.is_empty());
}

// ---------------------------------------------------------------------------
// GetById
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn get_by_id_resolves_author_and_stages_event(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let book = BookRepo::insert(&pool, "Hello", "World", author_id)
        .await
        .unwrap();

    let found = usecase(&pool).get_by_id(book.id).await.unwrap();
    assert_eq!(found.id, book.id);
    assert_eq!(found.content, "World");
    assert_eq!(found.author.id, author_id);
    assert_eq!(found.author.name, "A");

    let events = staged_events(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "get.by.id.sql");
    assert_eq!(events[0].content, "World");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_by_id_missing_book_is_not_found(pool: PgPool) {
    let err = usecase(&pool).get_by_id(9999).await.unwrap_err();
    assert_matches!(
        err,
        AppError::Core(CoreError::NotFound { entity: "book", id: 9999 })
    );
    assert!(staged_events(&pool).await.is_empty());
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_deadline_surfaces_as_timeout(pool: PgPool) {
    let starved = BookUsecase::new(pool.clone(), Duration::from_nanos(1));

    let err = starved.fetch(5, 0).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Timeout { operation: "fetch" }));
}
