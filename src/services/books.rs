//! Book catalog and lifecycle service

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult, LibraryError},
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        Book, BookStatus, DamageReport, NewBook, NewDamageReport,
    },
    repository::{Repository, Session},
};

/// Book availability state machine and damage-driven replacement.
///
/// Every operation works inside the caller's session; nothing is committed here.
#[async_trait]
pub trait BookLifecycle: Send + Sync {
    /// Load a book, failing with `NotFound` when it doesn't exist
    async fn get_book(&self, session: &mut dyn Session, book_id: i32) -> AppResult<Book>;

    /// Move a book to `status` through the state machine
    async fn change_status(
        &self,
        session: &mut dyn Session,
        book_id: i32,
        status: BookStatus,
    ) -> AppResult<Book>;

    /// Acquire a fresh copy of a book and retire the old one to `terminal_status`
    /// (`Lost` or `Decommissioned`). Returns the new copy.
    async fn replace_book(
        &self,
        session: &mut dyn Session,
        book_id: i32,
        terminal_status: BookStatus,
    ) -> AppResult<Book>;

    /// Persist damage reports against their books
    async fn record_damages(
        &self,
        session: &mut dyn Session,
        damages: &[NewDamageReport],
    ) -> AppResult<Vec<DamageReport>>;
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a new book to the collection, dated today
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let today = today();
        data.check(today)?;

        let mut session = self.repository.begin().await?;
        let book = session.insert_book(&data.into_new_book(today)).await?;
        session.commit().await?;

        tracing::info!("Book '{}' added with id {}", book.title, book.id);
        Ok(book)
    }

    pub async fn get(&self, id: i32) -> AppResult<Book> {
        let mut session = self.repository.begin().await?;
        self.get_book(session.as_mut(), id).await
    }

    /// List books, optionally restricted to one author
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut session = self.repository.begin().await?;

        match (&query.author_name, &query.author_surname) {
            (None, None) => session.list_books().await,
            (Some(name), Some(surname))
                if !name.trim().is_empty() && !surname.trim().is_empty() =>
            {
                session.books_by_author(name, surname).await
            }
            _ => Err(AppError::BadRequest(
                "Both author_name and author_surname are required to search by author".to_string(),
            )),
        }
    }

    /// Update a book's details. Status and acquisition date are left untouched.
    pub async fn update(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.check(today())?;

        let mut session = self.repository.begin().await?;
        let mut book = self.get_book(session.as_mut(), id).await?;
        book.title = data.title;
        book.genre = data.genre;
        book.publish_date = data.publish_date;
        book.author = data.author;
        book.price = data.price;
        session.update_book(&book).await?;
        session.commit().await?;

        tracing::info!("Book {} updated", id);
        Ok(book)
    }

    /// Delete a book. Loans still pointing at it are not checked.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut session = self.repository.begin().await?;
        if !session.delete_book(id).await? {
            return Err(LibraryError::book_not_found(id).into());
        }
        session.commit().await?;

        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    /// Damage reports recorded against a book
    pub async fn damages(&self, id: i32) -> AppResult<Vec<DamageReport>> {
        let mut session = self.repository.begin().await?;
        self.get_book(session.as_mut(), id).await?;
        session.damage_reports_for_book(id).await
    }
}

#[async_trait]
impl BookLifecycle for BookService {
    async fn get_book(&self, session: &mut dyn Session, book_id: i32) -> AppResult<Book> {
        session
            .find_book(book_id)
            .await?
            .ok_or_else(|| LibraryError::book_not_found(book_id).into())
    }

    async fn change_status(
        &self,
        session: &mut dyn Session,
        book_id: i32,
        status: BookStatus,
    ) -> AppResult<Book> {
        let mut book = self.get_book(session, book_id).await?;
        let previous = book.status;
        book.change_status(status)?;
        session.update_book(&book).await?;

        tracing::debug!("Book {} status: {} -> {}", book_id, previous, status);
        Ok(book)
    }

    async fn replace_book(
        &self,
        session: &mut dyn Session,
        book_id: i32,
        terminal_status: BookStatus,
    ) -> AppResult<Book> {
        if !terminal_status.is_terminal() {
            return Err(AppError::Internal(format!(
                "A replaced book must end lost or decommissioned, not {}",
                terminal_status
            )));
        }

        let mut old = self.get_book(session, book_id).await?;
        let replacement = session
            .insert_book(&NewBook::replacement_for(&old, today()))
            .await?;

        old.change_status(terminal_status)?;
        session.update_book(&old).await?;

        tracing::info!(
            "Book {} retired as {}, replaced by book {}",
            book_id,
            terminal_status,
            replacement.id
        );
        Ok(replacement)
    }

    async fn record_damages(
        &self,
        session: &mut dyn Session,
        damages: &[NewDamageReport],
    ) -> AppResult<Vec<DamageReport>> {
        let mut recorded = Vec::with_capacity(damages.len());
        for damage in damages {
            recorded.push(session.insert_damage_report(damage).await?);
        }
        Ok(recorded)
    }
}
