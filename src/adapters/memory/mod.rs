pub mod catalog_store;
pub mod loan_ledger_store;
pub mod member_store;

use crate::domain::{Book, BookId, Loan, LoanId, Member, MemberId};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// All three collections live behind one lock so that a loan write and the
/// matching copy-count update are applied in the same critical section.
#[derive(Debug, Default)]
pub(crate) struct LibraryState {
    pub(crate) books: BTreeMap<BookId, Book>,
    pub(crate) members: BTreeMap<MemberId, Member>,
    pub(crate) loans: Vec<Loan>,
    pub(crate) loan_index: HashMap<LoanId, usize>,
}

/// In-memory implementation of every storage port
///
/// Cloning is cheap and every clone shares the same state, so one instance
/// can be handed out as `CatalogStore`, `MemberStore` and `LoanLedgerStore`.
/// Used for local runs without PostgreSQL and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<LibraryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, LibraryState>> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".into())
    }

    /// Copy matching records out under the lock and stream them afterwards,
    /// so the lock is never held while a consumer polls.
    pub(crate) fn snapshot<T, F>(&self, select: F) -> BoxStream<'static, Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&LibraryState) -> Vec<T>,
    {
        match self.lock() {
            Ok(state) => {
                let items = select(&state);
                stream::iter(items.into_iter().map(Ok)).boxed()
            }
            Err(e) => stream::iter(vec![Err(e)]).boxed(),
        }
    }
}
