pub mod author_repo;
pub mod book_repo;
pub mod outbox_repo;

pub use author_repo::AuthorRepo;
pub use book_repo::BookRepo;
pub use outbox_repo::OutboxRepo;
