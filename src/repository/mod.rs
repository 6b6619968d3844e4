//! Repository layer: the record store behind the lending services.
//!
//! All reads and writes go through a [`Session`], a unit of work opened from a
//! [`Store`]. Changes made in a session become visible only when it is
//! committed; dropping a session without committing discards them.

pub mod books;
pub mod damages;
pub mod loan_events;
pub mod memory;
pub mod postgres;
pub mod visitors;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Book, DamageReport, LoanEvent, NewBook, NewDamageReport, NewLoanEvent, NewVisitor,
        Visitor,
    },
};

/// One unit of work against the record store.
///
/// Visitor and book point lookups lock the record until the session ends, so
/// concurrent sessions touching the same book or visitor are serialized.
#[async_trait]
pub trait Session: Send {
    async fn find_book(&mut self, id: i32) -> AppResult<Option<Book>>;
    async fn list_books(&mut self) -> AppResult<Vec<Book>>;
    async fn books_by_author(&mut self, name: &str, surname: &str) -> AppResult<Vec<Book>>;
    async fn insert_book(&mut self, book: &NewBook) -> AppResult<Book>;
    /// Fails with `NotFound` when the book doesn't exist
    async fn update_book(&mut self, book: &Book) -> AppResult<()>;
    /// Returns false when there was nothing to delete
    async fn delete_book(&mut self, id: i32) -> AppResult<bool>;

    /// Visitors are returned with their loan history attached
    async fn find_visitor(&mut self, id: i32) -> AppResult<Option<Visitor>>;
    async fn list_visitors(&mut self) -> AppResult<Vec<Visitor>>;
    async fn insert_visitor(&mut self, visitor: &NewVisitor) -> AppResult<Visitor>;
    /// Persists contact details and debt; fails with `NotFound` when missing
    async fn update_visitor(&mut self, visitor: &Visitor) -> AppResult<()>;
    async fn delete_visitor(&mut self, id: i32) -> AppResult<bool>;

    async fn find_loan_event(&mut self, id: i32) -> AppResult<Option<LoanEvent>>;
    async fn list_loan_events(&mut self) -> AppResult<Vec<LoanEvent>>;
    /// History of one (visitor, book) pair, oldest first
    async fn loan_events_for_pair(
        &mut self,
        visitor_id: i32,
        book_id: i32,
    ) -> AppResult<Vec<LoanEvent>>;
    /// Events dated within `[start, end]`, oldest first
    async fn loan_events_between(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LoanEvent>>;
    async fn insert_loan_event(&mut self, event: &NewLoanEvent) -> AppResult<LoanEvent>;

    async fn insert_damage_report(&mut self, report: &NewDamageReport) -> AppResult<DamageReport>;
    async fn damage_reports_for_book(&mut self, book_id: i32) -> AppResult<Vec<DamageReport>>;

    /// Make every change of this session durable at once.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Source of sessions
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn Session>>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Handle to the configured record store, shared by all services
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn Store>,
}

impl Repository {
    /// Create a repository backed by the given PostgreSQL pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_store(Arc::new(postgres::PgStore::new(pool)))
    }

    /// Create a repository backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(memory::MemoryStore::default()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open a new unit of work
    pub async fn begin(&self) -> AppResult<Box<dyn Session>> {
        self.store.begin().await
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
