use crate::domain::{ClosedLoan, Loan, LoanId, OpenLoan};
use crate::ports::loan_ledger_store::{LoanLedgerStore, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::InMemoryStore;

#[async_trait]
impl LoanLedgerStore for InMemoryStore {
    /// Reserve a copy and record the loan under a single lock
    async fn open(&self, loan: &OpenLoan) -> Result<bool> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if state.loan_index.contains_key(&loan.loan_id) {
            return Err(format!("loan {} already recorded", loan.loan_id).into());
        }

        let Some(book) = state.books.get_mut(&loan.book_id) else {
            return Ok(false);
        };
        let Ok(copies) = book.copies.checkout() else {
            return Ok(false);
        };

        book.copies = copies;
        state.loan_index.insert(loan.loan_id, state.loans.len());
        state.loans.push(Loan::Open(loan.clone()));
        Ok(true)
    }

    /// Mark the loan returned and release its copy under a single lock
    async fn close(&self, loan: &ClosedLoan) -> Result<bool> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let index = *state
            .loan_index
            .get(&loan.loan_id)
            .ok_or_else(|| format!("loan {} not found", loan.loan_id))?;

        if !state.loans[index].is_open() {
            return Ok(false);
        }

        let book = state
            .books
            .get_mut(&loan.book_id)
            .ok_or_else(|| format!("book {} not found", loan.book_id))?;
        // Validate before touching either record
        let copies = book.copies.checkin().map_err(|_| {
            format!(
                "book {} copy count out of sync: no copies on loan",
                loan.book_id
            )
        })?;

        book.copies = copies;
        state.loans[index] = Loan::Closed(loan.clone());
        Ok(true)
    }

    async fn find(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let state = self.lock()?;
        Ok(state
            .loan_index
            .get(&loan_id)
            .map(|&index| state.loans[index].clone()))
    }

    fn stream_open(&self) -> BoxStream<'_, Result<Loan>> {
        self.snapshot(|state| {
            state
                .loans
                .iter()
                .filter(|loan| loan.is_open())
                .cloned()
                .collect()
        })
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Loan>> {
        self.snapshot(|state| state.loans.clone())
    }
}
