//! PostgreSQL record store: one database transaction per session

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use super::{books, damages, loan_events, visitors, Session, Store};
use crate::{
    error::AppResult,
    models::{
        Book, DamageReport, LoanEvent, NewBook, NewDamageReport, NewLoanEvent, NewVisitor,
        Visitor,
    },
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &Pool<Postgres>) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn Session>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Session over an open transaction; dropping it rolls the transaction back
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PgSession {
    async fn find_book(&mut self, id: i32) -> AppResult<Option<Book>> {
        books::find(&mut self.tx, id).await
    }

    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        books::list(&mut self.tx).await
    }

    async fn books_by_author(&mut self, name: &str, surname: &str) -> AppResult<Vec<Book>> {
        books::by_author(&mut self.tx, name, surname).await
    }

    async fn insert_book(&mut self, book: &NewBook) -> AppResult<Book> {
        books::insert(&mut self.tx, book).await
    }

    async fn update_book(&mut self, book: &Book) -> AppResult<()> {
        books::update(&mut self.tx, book).await
    }

    async fn delete_book(&mut self, id: i32) -> AppResult<bool> {
        books::delete(&mut self.tx, id).await
    }

    async fn find_visitor(&mut self, id: i32) -> AppResult<Option<Visitor>> {
        visitors::find(&mut self.tx, id).await
    }

    async fn list_visitors(&mut self) -> AppResult<Vec<Visitor>> {
        visitors::list(&mut self.tx).await
    }

    async fn insert_visitor(&mut self, visitor: &NewVisitor) -> AppResult<Visitor> {
        visitors::insert(&mut self.tx, visitor).await
    }

    async fn update_visitor(&mut self, visitor: &Visitor) -> AppResult<()> {
        visitors::update(&mut self.tx, visitor).await
    }

    async fn delete_visitor(&mut self, id: i32) -> AppResult<bool> {
        visitors::delete(&mut self.tx, id).await
    }

    async fn find_loan_event(&mut self, id: i32) -> AppResult<Option<LoanEvent>> {
        loan_events::find(&mut self.tx, id).await
    }

    async fn list_loan_events(&mut self) -> AppResult<Vec<LoanEvent>> {
        loan_events::list(&mut self.tx).await
    }

    async fn loan_events_for_pair(
        &mut self,
        visitor_id: i32,
        book_id: i32,
    ) -> AppResult<Vec<LoanEvent>> {
        loan_events::for_pair(&mut self.tx, visitor_id, book_id).await
    }

    async fn loan_events_between(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LoanEvent>> {
        loan_events::between(&mut self.tx, start, end).await
    }

    async fn insert_loan_event(&mut self, event: &NewLoanEvent) -> AppResult<LoanEvent> {
        loan_events::insert(&mut self.tx, event).await
    }

    async fn insert_damage_report(&mut self, report: &NewDamageReport) -> AppResult<DamageReport> {
        damages::insert(&mut self.tx, report).await
    }

    async fn damage_reports_for_book(&mut self, book_id: i32) -> AppResult<Vec<DamageReport>> {
        damages::for_book(&mut self.tx, book_id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
