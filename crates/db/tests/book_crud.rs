//! Integration tests for the repository layer against a real database:
//! - Book CRUD with typed `Option` existence results
//! - Author lookup
//! - Outbox enqueue/drain bookkeeping

use libris_db::repositories::{AuthorRepo, BookRepo, OutboxRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_author(pool: &PgPool, name: &str) -> i64 {
    AuthorRepo::insert(pool, name)
        .await
        .expect("author insert should succeed")
        .id
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_and_get_book(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;

    let book = BookRepo::insert(&pool, "Hello", "World", author_id)
        .await
        .unwrap();
    assert_eq!(book.title, "Hello");
    assert_eq!(book.content, "World");
    assert_eq!(book.author_id, author_id);

    let found = BookRepo::get_by_id(&pool, book.id).await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().content, "World");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_missing_book_is_none(pool: PgPool) {
    let found = BookRepo::get_by_id(&pool, 9999).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_fetch_respects_limit_and_offset(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;

    for i in 0..7 {
        BookRepo::insert(&pool, &format!("t{i}"), &format!("c{i}"), author_id)
            .await
            .unwrap();
    }

    let page = BookRepo::fetch(&pool, 5, 0).await.unwrap();
    assert_eq!(page.len(), 5);

    let rest = BookRepo::fetch(&pool, 5, 5).await.unwrap();
    assert_eq!(rest.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_book_returns_updated_row(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let book = BookRepo::insert(&pool, "old", "old content", author_id)
        .await
        .unwrap();

    let updated = BookRepo::update(&pool, book.id, "new", "new content", author_id)
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(updated.title, "new");
    assert_eq!(updated.content, "new content");

    let missing = BookRepo::update(&pool, 9999, "x", "y", author_id)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_book(pool: PgPool) {
    let author_id = seed_author(&pool, "A").await;
    let book = BookRepo::insert(&pool, "t", "c", author_id).await.unwrap();

    assert!(BookRepo::delete(&pool, book.id).await.unwrap());
    assert!(BookRepo::get_by_id(&pool, book.id).await.unwrap().is_none());
    assert!(!BookRepo::delete(&pool, book.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_with_unknown_author_is_rejected(pool: PgPool) {
    let result = BookRepo::insert(&pool, "t", "c", 424242).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_get_author_by_id(pool: PgPool) {
    let id = seed_author(&pool, "Ursula").await;

    let author = AuthorRepo::get_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(author.name, "Ursula");

    assert!(AuthorRepo::get_by_id(&pool, 9999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_outbox_enqueue_and_mark_published(pool: PgPool) {
    let id = OutboxRepo::enqueue(&pool, "add.sql", "content").await.unwrap();

    let pending = OutboxRepo::list_unpublished(&pool, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].subject, "add.sql");
    assert_eq!(pending[0].attempts, 0);
    assert!(pending[0].published_at.is_none());

    OutboxRepo::mark_published(&pool, id).await.unwrap();
    assert!(OutboxRepo::list_unpublished(&pool, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_outbox_record_failure_keeps_row_eligible(pool: PgPool) {
    let id = OutboxRepo::enqueue(&pool, "update.sql", "content")
        .await
        .unwrap();

    OutboxRepo::record_failure(&pool, id).await.unwrap();
    OutboxRepo::record_failure(&pool, id).await.unwrap();

    let pending = OutboxRepo::list_unpublished(&pool, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_outbox_lists_oldest_first(pool: PgPool) {
    let first = OutboxRepo::enqueue(&pool, "add.sql", "1").await.unwrap();
    let second = OutboxRepo::enqueue(&pool, "add.sql", "2").await.unwrap();

    let pending = OutboxRepo::list_unpublished(&pool, 10).await.unwrap();
    assert_eq!(pending[0].id, first);
    assert_eq!(pending[1].id, second);
}
