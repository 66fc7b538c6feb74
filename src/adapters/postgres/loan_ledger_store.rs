use crate::domain::{BookId, ClosedLoan, Loan, LoanCore, LoanId, MemberId, OpenLoan};
use crate::ports::loan_ledger_store::{LoanLedgerStore as LoanLedgerStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::invalid_data;

/// PostgreSQLの行データをLoanに変換する
///
/// returned_atの有無で未返却・返却済みの状態を決める。
fn map_row_to_loan(row: &PgRow) -> Loan {
    let core = LoanCore {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        book_id: BookId::new(row.get("book_id")),
        member_id: MemberId::new(row.get("member_id")),
        issued_at: row.get("issued_at"),
    };

    let returned_at: Option<DateTime<Utc>> = row.get("returned_at");
    match returned_at {
        None => Loan::Open(OpenLoan { core }),
        Some(returned_at) => Loan::Closed(ClosedLoan { core, returned_at }),
    }
}

/// PostgreSQL implementation of LoanLedgerStore
///
/// Each ledger write runs in one transaction together with the matching
/// `books.available_copies` update. Both updates are conditional so that
/// concurrent callers can neither oversell a book nor return a loan twice.
pub struct LoanLedgerStore {
    pool: PgPool,
}

impl LoanLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanLedgerStoreTrait for LoanLedgerStore {
    async fn open(&self, loan: &OpenLoan) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Decrement only while a copy is left; a concurrent UPDATE on the same
        // row waits for our lock and re-checks the condition afterwards.
        let reserved = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1
            WHERE book_id = $1 AND available_copies > 0
            "#,
        )
        .bind(loan.book_id.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if reserved == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO loans (loan_id, book_id, member_id, issued_at, returned_at)
            VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.member_id.value())
        .bind(loan.issued_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn close(&self, loan: &ClosedLoan) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE loans
            SET returned_at = $2
            WHERE loan_id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.returned_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let released = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1
            WHERE book_id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(loan.book_id.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if released == 0 {
            tx.rollback().await?;
            return Err(invalid_data(format!(
                "book {} copy count out of sync: no copies on loan",
                loan.book_id
            )));
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn find(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT loan_id, book_id, member_id, issued_at, returned_at
            FROM loans
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// Uses the partial index on open loans
    fn stream_open(&self) -> BoxStream<'_, Result<Loan>> {
        sqlx::query(
            r#"
            SELECT loan_id, book_id, member_id, issued_at, returned_at
            FROM loans
            WHERE returned_at IS NULL
            ORDER BY sequence_number ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| -> Result<Loan> { Ok(map_row_to_loan(&row_result?)) })
        .boxed()
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Loan>> {
        sqlx::query(
            r#"
            SELECT loan_id, book_id, member_id, issued_at, returned_at
            FROM loans
            ORDER BY sequence_number ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| -> Result<Loan> { Ok(map_row_to_loan(&row_result?)) })
        .boxed()
    }
}
