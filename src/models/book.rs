//! Book (physical copy) model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BookStatus;
use crate::error::{AppError, AppResult, LibraryError};

/// Book author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub name: String,
    pub surname: String,
}

impl Author {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.surname.trim().is_empty()
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub publish_date: NaiveDate,
    pub author: Author,
    pub price: Decimal,
    pub status: BookStatus,
    /// Date the copy entered the collection; never changes afterwards
    pub date_added: NaiveDate,
}

impl Book {
    /// Move the book through the availability state machine.
    pub fn change_status(&mut self, next: BookStatus) -> Result<(), LibraryError> {
        self.status = self.status.transition_to(next)?;
        Ok(())
    }
}

/// Book ready to be inserted (no id yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub genre: String,
    pub publish_date: NaiveDate,
    pub author: Author,
    pub price: Decimal,
    pub status: BookStatus,
    pub date_added: NaiveDate,
}

impl NewBook {
    /// A fresh, available copy of `book` acquired on `today`
    pub fn replacement_for(book: &Book, today: NaiveDate) -> Self {
        Self {
            title: book.title.clone(),
            genre: book.genre.clone(),
            publish_date: book.publish_date,
            author: book.author.clone(),
            price: book.price,
            status: BookStatus::Available,
            date_added: today,
        }
    }
}

/// Create book request. Also used to update a book's details.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    pub publish_date: NaiveDate,
    pub author: Author,
    pub price: Decimal,
}

/// Update book details request
pub type UpdateBook = CreateBook;

/// Highest price a book may be catalogued at. Keeps fine arithmetic far from
/// `Decimal::MAX` however many damages are reported.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

impl CreateBook {
    /// Check the request against the cataloguing rules as of `today`.
    pub fn check(&self, today: NaiveDate) -> AppResult<()> {
        self.validate()?;

        if !self.author.is_complete() {
            return Err(AppError::Validation(
                "Author's name and surname cannot be empty".to_string(),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price must be greater than zero".to_string(),
            ));
        }
        if self.price > MAX_PRICE {
            return Err(AppError::Validation(format!(
                "Price cannot exceed {}",
                MAX_PRICE
            )));
        }
        if self.publish_date > today {
            return Err(AppError::Validation(
                "Publish date cannot be in the future".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_new_book(self, date_added: NaiveDate) -> NewBook {
        NewBook {
            title: self.title,
            genre: self.genre,
            publish_date: self.publish_date,
            author: self.author,
            price: self.price,
            status: BookStatus::Available,
            date_added,
        }
    }
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Author first name (requires `author_surname`)
    pub author_name: Option<String>,
    /// Author surname (requires `author_name`)
    pub author_surname: Option<String>,
}
