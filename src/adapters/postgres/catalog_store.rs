use crate::domain::{Book, BookId, CopyCount};
use crate::ports::catalog_store::{CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::invalid_data;

/// PostgreSQLの行データをBookに変換する
///
/// 蔵書数はCopyCount::restoreで不変条件を再検証する。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let book_id: i64 = row.get("book_id");
    let total: i32 = row.get("total_copies");
    let available: i32 = row.get("available_copies");
    let copies = CopyCount::restore(total, available).map_err(|e| {
        invalid_data(format!(
            "book {} has invalid copy count ({}/{}): {:?}",
            book_id, available, total, e
        ))
    })?;

    Ok(Book {
        book_id: BookId::new(book_id),
        title: row.get("title"),
        author: row.get("author"),
        copies,
    })
}

/// PostgreSQL implementation of CatalogStore
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    /// Insert a book, leaving any existing row with the same key untouched
    async fn insert(&self, book: Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (book_id) DO NOTHING
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.copies.total())
        .bind(book.copies.available())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, author, total_copies, available_copies
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Book>> {
        sqlx::query(
            r#"
            SELECT book_id, title, author, total_copies, available_copies
            FROM books
            ORDER BY book_id ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| -> Result<Book> {
            let row = row_result?;
            map_row_to_book(&row)
        })
        .boxed()
    }

    /// Case-insensitive literal substring match on title or author
    ///
    /// `strpos` keeps `%`, `_` and regex metacharacters in the query literal.
    fn search(&self, query: &str) -> BoxStream<'_, Result<Book>> {
        sqlx::query(
            r#"
            SELECT book_id, title, author, total_copies, available_copies
            FROM books
            WHERE strpos(lower(title), lower($1)) > 0
               OR strpos(lower(author), lower($1)) > 0
            ORDER BY book_id ASC
            "#,
        )
        .bind(query.to_string())
        .fetch(&self.pool)
        .map(|row_result| -> Result<Book> {
            let row = row_result?;
            map_row_to_book(&row)
        })
        .boxed()
    }
}
