mod catalog_service;
mod errors;
mod loan_service;
mod member_service;

use crate::ports::{CatalogStore, LoanLedgerStore, MemberStore};
use std::sync::Arc;

pub use catalog_service::{add_book, find_book, list_books, search_books};
pub use errors::{ApplicationError, Entity, Result};
pub use loan_service::{
    IssueOutcome, IssueRejection, ReturnOutcome, find_loan, issue_loan, list_all_loans,
    list_open_loans, return_loan,
};
pub use member_service::{find_member, list_members, register_member};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各サービス関数に依存関係を渡す。
/// ストアのハンドルは起動時に1度だけ作成され、全リクエストで共有される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog_store: Arc<dyn CatalogStore>,
    pub member_store: Arc<dyn MemberStore>,
    pub loan_ledger_store: Arc<dyn LoanLedgerStore>,
}
