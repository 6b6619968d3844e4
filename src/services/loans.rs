//! Loan workflow: borrowing and returning books.
//!
//! Each borrow or return runs in a single session. Preconditions are checked
//! against the book and visitor, fines are computed, then the book, the visitor
//! and the new loan event are written and committed together. Any failure
//! drops the session and persists nothing.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{books::BookLifecycle, fines::FineCalculator, visitors::VisitorLedger};
use crate::{
    error::{AppResult, LibraryError},
    models::{
        damage::DamageInput, loan_event::open_loan, Book, BookStatus, DamageRate, LoanEvent,
        NewDamageReport, NewLoanEvent,
    },
    repository::Repository,
};

/// What happened to the copy after a return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnDisposition {
    /// Back on the shelf
    Shelved,
    /// Declared lost and replaced
    Lost,
    /// Damaged beyond its price and replaced
    Decommissioned,
}

/// Result of a book return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub total_fine: Decimal,
    pub disposition: ReturnDisposition,
    pub return_event: LoanEvent,
    /// New copy bought when the returned one was retired
    pub replacement: Option<Book>,
}

#[derive(Clone)]
pub struct LoanWorkflow {
    repository: Repository,
    books: Arc<dyn BookLifecycle>,
    visitors: Arc<dyn VisitorLedger>,
    fines: Arc<dyn FineCalculator>,
}

impl LoanWorkflow {
    pub fn new(
        repository: Repository,
        books: Arc<dyn BookLifecycle>,
        visitors: Arc<dyn VisitorLedger>,
        fines: Arc<dyn FineCalculator>,
    ) -> Self {
        Self {
            repository,
            books,
            visitors,
            fines,
        }
    }

    /// Lend a book to a visitor
    pub async fn borrow_book(
        &self,
        visitor_id: i32,
        book_id: i32,
        borrow_date: NaiveDate,
    ) -> AppResult<LoanEvent> {
        let mut session = self.repository.begin().await?;

        let visitor = self.visitors.get_visitor(session.as_mut(), visitor_id).await?;
        let book = self.books.get_book(session.as_mut(), book_id).await?;

        if visitor.debt > Decimal::ZERO {
            tracing::warn!("Visitor {} refused a loan: debt {}", visitor_id, visitor.debt);
            return Err(LibraryError::DebtBlocksLoan {
                visitor_id,
                debt: visitor.debt,
            }
            .into());
        }
        if book.date_added > borrow_date {
            return Err(LibraryError::LoanBeforeAcquisition {
                borrow_date,
                date_added: book.date_added,
            }
            .into());
        }
        if book.status != BookStatus::Available {
            tracing::warn!("Book {} refused for loan: {}", book_id, book.status);
            return Err(LibraryError::BookUnavailable(book.status).into());
        }

        let event = self
            .visitors
            .attach_loan_event(
                session.as_mut(),
                visitor_id,
                NewLoanEvent::borrowed(visitor_id, book_id, borrow_date),
            )
            .await?;
        self.books
            .change_status(session.as_mut(), book_id, BookStatus::NotAvailable)
            .await?;

        session.commit().await?;

        tracing::info!(
            "Visitor {} borrowed book {} on {} (event {})",
            visitor_id,
            book_id,
            borrow_date,
            event.id
        );
        Ok(event)
    }

    /// Take a book back from a visitor, assessing overdue and damage fines.
    ///
    /// A copy reported lost, or damaged for at least its price, is replaced and
    /// the fine is the book price; the overdue fine is then not charged.
    pub async fn return_book(
        &self,
        visitor_id: i32,
        book_id: i32,
        return_date: NaiveDate,
        damages: Vec<DamageInput>,
    ) -> AppResult<ReturnOutcome> {
        let damages = damages
            .into_iter()
            .map(|d| d.into_report(book_id, return_date))
            .collect::<Result<Vec<NewDamageReport>, _>>()?;

        let mut session = self.repository.begin().await?;

        self.visitors.get_visitor(session.as_mut(), visitor_id).await?;
        let book = self.books.get_book(session.as_mut(), book_id).await?;

        let history = session.loan_events_for_pair(visitor_id, book_id).await?;
        let borrowed = open_loan(&history)
            .ok_or(LibraryError::NoActiveLoan {
                visitor_id,
                book_id,
            })?
            .clone();

        if return_date < borrowed.date {
            return Err(LibraryError::ReturnBeforeBorrow {
                return_date,
                borrow_date: borrowed.date,
            }
            .into());
        }

        let days_borrowed = (return_date - borrowed.date).num_days();
        let overdue_fine = self.fines.overdue_fine(days_borrowed);

        let return_event = self
            .visitors
            .attach_loan_event(
                session.as_mut(),
                visitor_id,
                NewLoanEvent::returned(visitor_id, book_id, return_date),
            )
            .await?;

        let mut damage_fine = Decimal::ZERO;
        if !damages.is_empty() {
            let retire_as = if damages.iter().any(|d| d.rate == DamageRate::Lost) {
                Some(ReturnDisposition::Lost)
            } else {
                damage_fine = self.fines.damage_fine(&damages, book.price);
                (damage_fine >= book.price).then_some(ReturnDisposition::Decommissioned)
            };

            if let Some(disposition) = retire_as {
                let terminal = match disposition {
                    ReturnDisposition::Lost => BookStatus::Lost,
                    _ => BookStatus::Decommissioned,
                };
                let replacement = self
                    .books
                    .replace_book(session.as_mut(), book_id, terminal)
                    .await?;
                session.commit().await?;

                tracing::info!(
                    "Visitor {} returned book {} {:?}; fine {} (overdue fine {} not charged)",
                    visitor_id,
                    book_id,
                    disposition,
                    book.price,
                    overdue_fine
                );
                return Ok(ReturnOutcome {
                    total_fine: book.price,
                    disposition,
                    return_event,
                    replacement: Some(replacement),
                });
            }
        }

        let total_fine = overdue_fine + damage_fine;
        if total_fine > Decimal::ZERO {
            self.visitors
                .add_fine_to_debt(session.as_mut(), visitor_id, total_fine)
                .await?;
        }
        if book.status == BookStatus::NotAvailable {
            self.books
                .change_status(session.as_mut(), book_id, BookStatus::Available)
                .await?;
        }
        self.books.record_damages(session.as_mut(), &damages).await?;

        session.commit().await?;

        tracing::info!(
            "Visitor {} returned book {} after {} days; fine {}",
            visitor_id,
            book_id,
            days_borrowed,
            total_fine
        );
        Ok(ReturnOutcome {
            total_fine,
            disposition: ReturnDisposition::Shelved,
            return_event,
            replacement: None,
        })
    }

    pub async fn get_loan_event(&self, id: i32) -> AppResult<LoanEvent> {
        let mut session = self.repository.begin().await?;
        session
            .find_loan_event(id)
            .await?
            .ok_or_else(|| LibraryError::loan_event_not_found(id).into())
    }

    pub async fn list_loan_events(&self) -> AppResult<Vec<LoanEvent>> {
        let mut session = self.repository.begin().await?;
        session.list_loan_events().await
    }

    /// Loan events dated within `[start, end]`
    pub async fn loan_events_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LoanEvent>> {
        if start > end {
            return Err(LibraryError::InvalidRange { start, end }.into());
        }
        let mut session = self.repository.begin().await?;
        session.loan_events_between(start, end).await
    }
}
