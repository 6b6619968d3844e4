//! Damage reports table queries

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection};

use crate::{
    error::{AppError, AppResult},
    models::{DamageRate, DamageReport, NewDamageReport},
};

#[derive(Debug, FromRow)]
struct DamageReportRow {
    id: i32,
    book_id: i32,
    description: String,
    rate: i16,
    date_reported: NaiveDate,
}

impl TryFrom<DamageReportRow> for DamageReport {
    type Error = AppError;

    fn try_from(row: DamageReportRow) -> Result<Self, Self::Error> {
        // A bad code in storage is corrupt data, not a client mistake
        let rate = DamageRate::try_from(row.rate).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(DamageReport {
            id: row.id,
            book_id: row.book_id,
            description: row.description,
            rate,
            date_reported: row.date_reported,
        })
    }
}

pub async fn insert(conn: &mut PgConnection, report: &NewDamageReport) -> AppResult<DamageReport> {
    let row = sqlx::query_as::<_, DamageReportRow>(
        r#"
        INSERT INTO damage_reports (book_id, description, rate, date_reported)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(report.book_id)
    .bind(&report.description)
    .bind(i16::from(report.rate))
    .bind(report.date_reported)
    .fetch_one(&mut *conn)
    .await?;
    DamageReport::try_from(row)
}

pub async fn for_book(conn: &mut PgConnection, book_id: i32) -> AppResult<Vec<DamageReport>> {
    sqlx::query_as::<_, DamageReportRow>(
        "SELECT * FROM damage_reports WHERE book_id = $1 ORDER BY date_reported, id",
    )
    .bind(book_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(DamageReport::try_from)
    .collect()
}
