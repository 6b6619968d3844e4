//! Loan events table queries

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection};

use crate::{
    error::{AppError, AppResult},
    models::{LoanEvent, LoanStatus, NewLoanEvent},
};

#[derive(Debug, FromRow)]
struct LoanEventRow {
    id: i32,
    visitor_id: i32,
    book_id: i32,
    date: NaiveDate,
    status: i16,
}

impl TryFrom<LoanEventRow> for LoanEvent {
    type Error = AppError;

    fn try_from(row: LoanEventRow) -> Result<Self, Self::Error> {
        Ok(LoanEvent {
            id: row.id,
            visitor_id: row.visitor_id,
            book_id: row.book_id,
            date: row.date,
            status: LoanStatus::try_from(row.status)?,
        })
    }
}

fn into_events(rows: Vec<LoanEventRow>) -> AppResult<Vec<LoanEvent>> {
    rows.into_iter().map(LoanEvent::try_from).collect()
}

pub async fn find(conn: &mut PgConnection, id: i32) -> AppResult<Option<LoanEvent>> {
    sqlx::query_as::<_, LoanEventRow>("SELECT * FROM loan_events WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(LoanEvent::try_from)
        .transpose()
}

pub async fn list(conn: &mut PgConnection) -> AppResult<Vec<LoanEvent>> {
    let rows = sqlx::query_as::<_, LoanEventRow>("SELECT * FROM loan_events ORDER BY date, id")
        .fetch_all(&mut *conn)
        .await?;
    into_events(rows)
}

pub async fn for_visitor(conn: &mut PgConnection, visitor_id: i32) -> AppResult<Vec<LoanEvent>> {
    let rows = sqlx::query_as::<_, LoanEventRow>(
        "SELECT * FROM loan_events WHERE visitor_id = $1 ORDER BY date, id",
    )
    .bind(visitor_id)
    .fetch_all(&mut *conn)
    .await?;
    into_events(rows)
}

pub async fn for_pair(
    conn: &mut PgConnection,
    visitor_id: i32,
    book_id: i32,
) -> AppResult<Vec<LoanEvent>> {
    let rows = sqlx::query_as::<_, LoanEventRow>(
        r#"
        SELECT * FROM loan_events
        WHERE visitor_id = $1 AND book_id = $2
        ORDER BY date, id
        "#,
    )
    .bind(visitor_id)
    .bind(book_id)
    .fetch_all(&mut *conn)
    .await?;
    into_events(rows)
}

pub async fn between(
    conn: &mut PgConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<LoanEvent>> {
    let rows = sqlx::query_as::<_, LoanEventRow>(
        "SELECT * FROM loan_events WHERE date >= $1 AND date <= $2 ORDER BY date, id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;
    into_events(rows)
}

pub async fn insert(conn: &mut PgConnection, event: &NewLoanEvent) -> AppResult<LoanEvent> {
    let row = sqlx::query_as::<_, LoanEventRow>(
        r#"
        INSERT INTO loan_events (visitor_id, book_id, date, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(event.visitor_id)
    .bind(event.book_id)
    .bind(event.date)
    .bind(i16::from(event.status))
    .fetch_one(&mut *conn)
    .await?;
    LoanEvent::try_from(row)
}
