//! Loan event (borrow / return transaction) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::enums::LoanStatus;

/// Immutable record of a book being borrowed or returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanEvent {
    pub id: i32,
    pub visitor_id: i32,
    pub book_id: i32,
    pub date: NaiveDate,
    pub status: LoanStatus,
}

/// Loan event ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoanEvent {
    pub visitor_id: i32,
    pub book_id: i32,
    pub date: NaiveDate,
    pub status: LoanStatus,
}

impl NewLoanEvent {
    pub fn borrowed(visitor_id: i32, book_id: i32, date: NaiveDate) -> Self {
        Self {
            visitor_id,
            book_id,
            date,
            status: LoanStatus::Borrowed,
        }
    }

    pub fn returned(visitor_id: i32, book_id: i32, date: NaiveDate) -> Self {
        Self {
            visitor_id,
            book_id,
            date,
            status: LoanStatus::Returned,
        }
    }
}

/// Find the open loan in the history of one (visitor, book) pair: the latest
/// `Borrowed` event not followed by a `Returned` one. Events are ordered by
/// date, then by id for same-day events.
pub fn open_loan(events: &[LoanEvent]) -> Option<&LoanEvent> {
    let mut ordered: Vec<&LoanEvent> = events.iter().collect();
    ordered.sort_by_key(|e| (e.date, e.id));

    ordered.into_iter().fold(None, |_open, event| match event.status {
        LoanStatus::Borrowed => Some(event),
        LoanStatus::Returned => None,
    })
}

/// Date range filter for loan events (inclusive on both ends)
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanEventQuery {
    /// First day of the range
    pub start: Option<NaiveDate>,
    /// Last day of the range
    pub end: Option<NaiveDate>,
}
