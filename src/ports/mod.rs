pub mod catalog_store;
pub mod loan_ledger_store;
pub mod member_store;

pub use catalog_store::CatalogStore;
pub use loan_ledger_store::LoanLedgerStore;
pub use member_store::MemberStore;
