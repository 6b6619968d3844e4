//! Visitors table queries

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};

use super::loan_events;
use crate::{
    error::{AppResult, LibraryError},
    models::{NewVisitor, Visitor},
};

#[derive(Debug, FromRow)]
struct VisitorRow {
    id: i32,
    name: String,
    surname: String,
    email: String,
    debt: Decimal,
}

impl From<VisitorRow> for Visitor {
    fn from(row: VisitorRow) -> Self {
        Visitor {
            id: row.id,
            name: row.name,
            surname: row.surname,
            email: row.email,
            debt: row.debt,
            loan_events: Vec::new(),
        }
    }
}

/// Get a visitor with its loan history, locking the visitor row
pub async fn find(conn: &mut PgConnection, id: i32) -> AppResult<Option<Visitor>> {
    let row = sqlx::query_as::<_, VisitorRow>("SELECT * FROM visitors WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut visitor = Visitor::from(row);
    visitor.loan_events = loan_events::for_visitor(conn, id).await?;
    Ok(Some(visitor))
}

pub async fn list(conn: &mut PgConnection) -> AppResult<Vec<Visitor>> {
    let rows = sqlx::query_as::<_, VisitorRow>("SELECT * FROM visitors ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    let mut history = HashMap::<i32, Vec<_>>::new();
    for event in loan_events::list(conn).await? {
        history.entry(event.visitor_id).or_default().push(event);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut visitor = Visitor::from(row);
            visitor.loan_events = history.remove(&visitor.id).unwrap_or_default();
            visitor
        })
        .collect())
}

pub async fn insert(conn: &mut PgConnection, visitor: &NewVisitor) -> AppResult<Visitor> {
    let row = sqlx::query_as::<_, VisitorRow>(
        r#"
        INSERT INTO visitors (name, surname, email, debt)
        VALUES ($1, $2, $3, 0)
        RETURNING *
        "#,
    )
    .bind(&visitor.name)
    .bind(&visitor.surname)
    .bind(&visitor.email)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into())
}

pub async fn update(conn: &mut PgConnection, visitor: &Visitor) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE visitors SET name = $1, surname = $2, email = $3, debt = $4 WHERE id = $5",
    )
    .bind(&visitor.name)
    .bind(&visitor.surname)
    .bind(&visitor.email)
    .bind(visitor.debt)
    .bind(visitor.id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::visitor_not_found(visitor.id).into());
    }
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM visitors WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
