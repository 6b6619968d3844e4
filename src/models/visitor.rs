//! Visitor (borrower) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::loan_event::LoanEvent;
use crate::error::LibraryError;

/// Visitor record with its loan history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Visitor {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    /// Unpaid fines; a visitor in debt can't borrow
    pub debt: Decimal,
    #[serde(default)]
    pub loan_events: Vec<LoanEvent>,
}

impl Visitor {
    pub fn add_fine_to_debt(&mut self, fine: Decimal) -> Result<(), LibraryError> {
        if fine <= Decimal::ZERO {
            return Err(LibraryError::InvalidFineAmount(fine));
        }
        self.debt = self
            .debt
            .checked_add(fine)
            .ok_or(LibraryError::InvalidFineAmount(fine))?;
        Ok(())
    }

    pub fn pay_off_debt(&mut self) {
        self.debt = Decimal::ZERO;
    }

    pub fn attach(&mut self, event: LoanEvent) {
        self.loan_events.push(event);
    }
}

/// Visitor ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisitor {
    pub name: String,
    pub surname: String,
    pub email: String,
}

/// Create visitor request. Also used to update contact details.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVisitor {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Surname is required"))]
    pub surname: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Update visitor request
pub type UpdateVisitor = CreateVisitor;

impl From<CreateVisitor> for NewVisitor {
    fn from(v: CreateVisitor) -> Self {
        Self {
            name: v.name,
            surname: v.surname,
            email: v.email,
        }
    }
}
