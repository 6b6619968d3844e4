//! Shared domain enums and their integer storage codes

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, LibraryError};

// ---------------------------------------------------------------------------
// BookStatus
// ---------------------------------------------------------------------------

/// Availability status of a physical book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum BookStatus {
    Available = 0,
    NotAvailable = 1,
    Lost = 2,
    Decommissioned = 3,
}

impl BookStatus {
    /// Lost and decommissioned copies never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookStatus::Lost | BookStatus::Decommissioned)
    }

    /// Validate a transition from `self` to `next` and return the new status.
    pub fn transition_to(self, next: BookStatus) -> Result<BookStatus, LibraryError> {
        if self.is_terminal() {
            return Err(LibraryError::TerminalState(self));
        }
        if self == next {
            return Err(LibraryError::RedundantStatusChange(self));
        }
        Ok(next)
    }

    /// Reason given to a visitor trying to borrow a book in this status
    pub fn unavailable_reason(self) -> &'static str {
        match self {
            BookStatus::Available => "The book is available",
            BookStatus::NotAvailable => "The book is currently unavailable",
            BookStatus::Lost => "The book is lost and can't be taken",
            BookStatus::Decommissioned => "The book is decommissioned and can't be taken",
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

impl TryFrom<i16> for BookStatus {
    type Error = AppError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(BookStatus::Available),
            1 => Ok(BookStatus::NotAvailable),
            2 => Ok(BookStatus::Lost),
            3 => Ok(BookStatus::Decommissioned),
            _ => Err(AppError::Internal(format!("Unknown book status code {}", v))),
        }
    }
}

impl From<BookStatus> for i16 {
    fn from(s: BookStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookStatus::Available => "available",
            BookStatus::NotAvailable => "not available",
            BookStatus::Lost => "lost",
            BookStatus::Decommissioned => "decommissioned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Kind of loan event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum LoanStatus {
    Borrowed = 0,
    Returned = 1,
}

impl TryFrom<i16> for LoanStatus {
    type Error = AppError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(LoanStatus::Borrowed),
            1 => Ok(LoanStatus::Returned),
            _ => Err(AppError::Internal(format!("Unknown loan status code {}", v))),
        }
    }
}

impl From<LoanStatus> for i16 {
    fn from(s: LoanStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// DamageRate
// ---------------------------------------------------------------------------

/// Severity of a damage reported on return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum DamageRate {
    Light = 0,
    Medium = 1,
    Critical = 2,
    Lost = 3,
}

/// Out-of-range codes are rejected here, before they reach fine calculation.
impl TryFrom<i16> for DamageRate {
    type Error = LibraryError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(DamageRate::Light),
            1 => Ok(DamageRate::Medium),
            2 => Ok(DamageRate::Critical),
            3 => Ok(DamageRate::Lost),
            _ => Err(LibraryError::UnknownDamageRate(v)),
        }
    }
}

impl From<DamageRate> for i16 {
    fn from(r: DamageRate) -> Self {
        r as i16
    }
}

impl std::fmt::Display for DamageRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DamageRate::Light => "light",
            DamageRate::Medium => "medium",
            DamageRate::Critical => "critical",
            DamageRate::Lost => "lost",
        };
        write!(f, "{}", label)
    }
}
