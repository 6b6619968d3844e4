//! In-memory record store.
//!
//! A session holds the store lock for its whole lifetime and works on a staged
//! copy of the tables, which replaces the committed tables on commit.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Session, Store};
use crate::{
    error::{AppResult, LibraryError},
    models::{
        Book, DamageReport, LoanEvent, NewBook, NewDamageReport, NewLoanEvent, NewVisitor,
        Visitor,
    },
};

/// Last id handed out per table; ids are never reused
#[derive(Debug, Clone, Default)]
struct Sequences {
    books: i32,
    visitors: i32,
    loan_events: i32,
    damage_reports: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct Tables {
    books: BTreeMap<i32, Book>,
    /// Stored without history; it is rebuilt from `loan_events` on read
    visitors: BTreeMap<i32, Visitor>,
    loan_events: BTreeMap<i32, LoanEvent>,
    damage_reports: BTreeMap<i32, DamageReport>,
    sequences: Sequences,
}

impl Tables {
    fn events_sorted(&self, filter: impl Fn(&LoanEvent) -> bool) -> Vec<LoanEvent> {
        let mut events: Vec<LoanEvent> = self
            .loan_events
            .values()
            .filter(|e| filter(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date, e.id));
        events
    }

    fn with_history(&self, visitor: &Visitor) -> Visitor {
        let mut visitor = visitor.clone();
        visitor.loan_events = self.events_sorted(|e| e.visitor_id == visitor.id);
        visitor
    }
}

/// Record store kept in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn Session>> {
        let committed = self.tables.clone().lock_owned().await;
        let staged = committed.clone();
        Ok(Box::new(MemorySession { committed, staged }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemorySession {
    committed: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl Session for MemorySession {
    async fn find_book(&mut self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.staged.books.get(&id).cloned())
    }

    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        Ok(self.staged.books.values().cloned().collect())
    }

    async fn books_by_author(&mut self, name: &str, surname: &str) -> AppResult<Vec<Book>> {
        Ok(self
            .staged
            .books
            .values()
            .filter(|b| b.author.name == name && b.author.surname == surname)
            .cloned()
            .collect())
    }

    async fn insert_book(&mut self, book: &NewBook) -> AppResult<Book> {
        let id = next(&mut self.staged.sequences.books);
        let book = Book {
            id,
            title: book.title.clone(),
            genre: book.genre.clone(),
            publish_date: book.publish_date,
            author: book.author.clone(),
            price: book.price,
            status: book.status,
            date_added: book.date_added,
        };
        self.staged.books.insert(id, book.clone());
        Ok(book)
    }

    async fn update_book(&mut self, book: &Book) -> AppResult<()> {
        let slot = self
            .staged
            .books
            .get_mut(&book.id)
            .ok_or_else(|| LibraryError::book_not_found(book.id))?;
        *slot = book.clone();
        Ok(())
    }

    async fn delete_book(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.staged.books.remove(&id).is_some())
    }

    async fn find_visitor(&mut self, id: i32) -> AppResult<Option<Visitor>> {
        Ok(self
            .staged
            .visitors
            .get(&id)
            .map(|v| self.staged.with_history(v)))
    }

    async fn list_visitors(&mut self) -> AppResult<Vec<Visitor>> {
        Ok(self
            .staged
            .visitors
            .values()
            .map(|v| self.staged.with_history(v))
            .collect())
    }

    async fn insert_visitor(&mut self, visitor: &NewVisitor) -> AppResult<Visitor> {
        let id = next(&mut self.staged.sequences.visitors);
        let visitor = Visitor {
            id,
            name: visitor.name.clone(),
            surname: visitor.surname.clone(),
            email: visitor.email.clone(),
            debt: Default::default(),
            loan_events: Vec::new(),
        };
        self.staged.visitors.insert(id, visitor.clone());
        Ok(visitor)
    }

    async fn update_visitor(&mut self, visitor: &Visitor) -> AppResult<()> {
        let slot = self
            .staged
            .visitors
            .get_mut(&visitor.id)
            .ok_or_else(|| LibraryError::visitor_not_found(visitor.id))?;
        slot.name = visitor.name.clone();
        slot.surname = visitor.surname.clone();
        slot.email = visitor.email.clone();
        slot.debt = visitor.debt;
        Ok(())
    }

    async fn delete_visitor(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.staged.visitors.remove(&id).is_some())
    }

    async fn find_loan_event(&mut self, id: i32) -> AppResult<Option<LoanEvent>> {
        Ok(self.staged.loan_events.get(&id).cloned())
    }

    async fn list_loan_events(&mut self) -> AppResult<Vec<LoanEvent>> {
        Ok(self.staged.events_sorted(|_| true))
    }

    async fn loan_events_for_pair(
        &mut self,
        visitor_id: i32,
        book_id: i32,
    ) -> AppResult<Vec<LoanEvent>> {
        Ok(self
            .staged
            .events_sorted(|e| e.visitor_id == visitor_id && e.book_id == book_id))
    }

    async fn loan_events_between(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LoanEvent>> {
        Ok(self.staged.events_sorted(|e| e.date >= start && e.date <= end))
    }

    async fn insert_loan_event(&mut self, event: &NewLoanEvent) -> AppResult<LoanEvent> {
        let id = next(&mut self.staged.sequences.loan_events);
        let event = LoanEvent {
            id,
            visitor_id: event.visitor_id,
            book_id: event.book_id,
            date: event.date,
            status: event.status,
        };
        self.staged.loan_events.insert(id, event.clone());
        Ok(event)
    }

    async fn insert_damage_report(&mut self, report: &NewDamageReport) -> AppResult<DamageReport> {
        let id = next(&mut self.staged.sequences.damage_reports);
        let report = DamageReport {
            id,
            book_id: report.book_id,
            description: report.description.clone(),
            rate: report.rate,
            date_reported: report.date_reported,
        };
        self.staged.damage_reports.insert(id, report.clone());
        Ok(report)
    }

    async fn damage_reports_for_book(&mut self, book_id: i32) -> AppResult<Vec<DamageReport>> {
        Ok(self
            .staged
            .damage_reports
            .values()
            .filter(|d| d.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemorySession {
            mut committed,
            staged,
        } = *self;
        *committed = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{Author, BookStatus};

    fn new_book() -> NewBook {
        NewBook {
            title: "Solaris".to_string(),
            genre: "Science fiction".to_string(),
            publish_date: NaiveDate::from_ymd_opt(1961, 1, 1).unwrap(),
            author: Author {
                name: "Stanislaw".to_string(),
                surname: "Lem".to_string(),
            },
            price: Decimal::new(1500, 2),
            status: BookStatus::Available,
            date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryStore::default();

        let mut session = store.begin().await.unwrap();
        let book = session.insert_book(&new_book()).await.unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.find_book(book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn test_dropped_session_rolls_back() {
        let store = MemoryStore::default();

        {
            let mut session = store.begin().await.unwrap();
            session.insert_book(&new_book()).await.unwrap();
        }

        let mut session = store.begin().await.unwrap();
        assert!(session.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = MemoryStore::default();
        let mut session = store.begin().await.unwrap();

        let first = session.insert_book(&new_book()).await.unwrap();
        assert!(session.delete_book(first.id).await.unwrap());
        let second = session.insert_book(&new_book()).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_visitor_history_is_attached() {
        let store = MemoryStore::default();
        let mut session = store.begin().await.unwrap();

        let visitor = session
            .insert_visitor(&NewVisitor {
                name: "Ada".to_string(),
                surname: "Lovelace".to_string(),
                email: "ada@example.org".to_string(),
            })
            .await
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        session
            .insert_loan_event(&NewLoanEvent::borrowed(visitor.id, 1, day))
            .await
            .unwrap();

        let loaded = session.find_visitor(visitor.id).await.unwrap().unwrap();
        assert_eq!(loaded.loan_events.len(), 1);
        assert_eq!(loaded.loan_events[0].book_id, 1);
    }
}
