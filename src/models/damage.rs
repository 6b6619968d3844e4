//! Damage report model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::DamageRate;
use crate::error::LibraryError;

/// Damage recorded against a book during a return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DamageReport {
    pub id: i32,
    pub book_id: i32,
    pub description: String,
    pub rate: DamageRate,
    pub date_reported: NaiveDate,
}

/// Damage report ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDamageReport {
    pub book_id: i32,
    pub description: String,
    pub rate: DamageRate,
    pub date_reported: NaiveDate,
}

/// Damage as submitted by a client
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DamageInput {
    pub description: String,
    /// 0=light, 1=medium, 2=critical, 3=lost
    pub rate: i16,
}

impl DamageInput {
    /// Validate the rate code and bind the damage to a book.
    pub fn into_report(
        self,
        book_id: i32,
        date_reported: NaiveDate,
    ) -> Result<NewDamageReport, LibraryError> {
        Ok(NewDamageReport {
            book_id,
            description: self.description,
            rate: DamageRate::try_from(self.rate)?,
            date_reported,
        })
    }
}
