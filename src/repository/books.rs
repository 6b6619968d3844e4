//! Books table queries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};

use crate::{
    error::{AppError, AppResult, LibraryError},
    models::{Author, Book, BookStatus, NewBook},
};

/// Row as stored in the `books` table
#[derive(Debug, FromRow)]
struct BookRow {
    id: i32,
    title: String,
    genre: String,
    publish_date: NaiveDate,
    author_name: String,
    author_surname: String,
    price: Decimal,
    status: i16,
    date_added: NaiveDate,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Book {
            id: row.id,
            title: row.title,
            genre: row.genre,
            publish_date: row.publish_date,
            author: Author {
                name: row.author_name,
                surname: row.author_surname,
            },
            price: row.price,
            status: BookStatus::try_from(row.status)?,
            date_added: row.date_added,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
    rows.into_iter().map(Book::try_from).collect()
}

/// Get a book by ID, locking its row for the rest of the transaction
pub async fn find(conn: &mut PgConnection, id: i32) -> AppResult<Option<Book>> {
    sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Book::try_from)
        .transpose()
}

pub async fn list(conn: &mut PgConnection) -> AppResult<Vec<Book>> {
    let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    into_books(rows)
}

pub async fn by_author(conn: &mut PgConnection, name: &str, surname: &str) -> AppResult<Vec<Book>> {
    let rows = sqlx::query_as::<_, BookRow>(
        "SELECT * FROM books WHERE author_name = $1 AND author_surname = $2 ORDER BY id",
    )
    .bind(name)
    .bind(surname)
    .fetch_all(&mut *conn)
    .await?;
    into_books(rows)
}

pub async fn insert(conn: &mut PgConnection, book: &NewBook) -> AppResult<Book> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        INSERT INTO books (title, genre, publish_date, author_name, author_surname, price, status, date_added)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&book.title)
    .bind(&book.genre)
    .bind(book.publish_date)
    .bind(&book.author.name)
    .bind(&book.author.surname)
    .bind(book.price)
    .bind(i16::from(book.status))
    .bind(book.date_added)
    .fetch_one(&mut *conn)
    .await?;
    Book::try_from(row)
}

/// Write back every column except `date_added`, which is fixed at creation
pub async fn update(conn: &mut PgConnection, book: &Book) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE books
        SET title = $1, genre = $2, publish_date = $3, author_name = $4,
            author_surname = $5, price = $6, status = $7
        WHERE id = $8
        "#,
    )
    .bind(&book.title)
    .bind(&book.genre)
    .bind(book.publish_date)
    .bind(&book.author.name)
    .bind(&book.author.surname)
    .bind(book.price)
    .bind(i16::from(book.status))
    .bind(book.id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::book_not_found(book.id).into());
    }
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
