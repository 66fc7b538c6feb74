use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, IssueLoanError, LoanId, MemberId, ReturnLoanError, book::Book};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Loan集約の共通フィールド
///
/// 未返却・返却済みのどちらの状態でも共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCore {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub issued_at: DateTime<Utc>,
}

/// 貸出中（未返却）状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLoan {
    #[serde(flatten)]
    pub core: LoanCore,
}

impl std::ops::Deref for OpenLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - returned_atが必須（型で保証）
/// - 以後変更不可
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub returned_at: DateTime<Utc>,
}

impl std::ops::Deref for ClosedLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Loan {
    Open(OpenLoan),
    Closed(ClosedLoan),
}

impl Loan {
    pub fn core(&self) -> &LoanCore {
        match self {
            Loan::Open(open) => &open.core,
            Loan::Closed(closed) => &closed.core,
        }
    }

    pub fn loan_id(&self) -> LoanId {
        self.core().loan_id
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Loan::Open(_) => None,
            Loan::Closed(closed) => Some(closed.returned_at),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Loan::Open(_))
    }
}

impl From<OpenLoan> for Loan {
    fn from(loan: OpenLoan) -> Self {
        Loan::Open(loan)
    }
}

impl From<ClosedLoan> for Loan {
    fn from(loan: ClosedLoan) -> Self {
        Loan::Closed(loan)
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出可能数が1以上であること
/// - 新しい貸出は未返却状態
/// - 書籍の貸出可能数は1減る
///
/// 副作用なし。新しいOpenLoanと更新後のBookを返す。
/// 永続化層は同じ遷移を条件付き更新として原子的に適用する必要がある。
pub fn issue_loan(
    book: &Book,
    member_id: MemberId,
    issued_at: DateTime<Utc>,
) -> Result<(OpenLoan, Book), IssueLoanError> {
    let copies = book.copies.checkout()?;

    let loan = OpenLoan {
        core: LoanCore {
            loan_id: LoanId::new(),
            book_id: book.book_id,
            member_id,
            issued_at,
        },
    };

    let book = Book {
        copies,
        ..book.clone()
    };

    Ok((loan, book))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 未返却の貸出のみ返却できる
/// - 返却済みの場合はエラーに返却済みの貸出をそのまま載せて返す
///
/// 副作用なし。ClosedLoanを返す。書籍側の貸出可能数の加算は台帳が行う。
pub fn return_loan(loan: Loan, returned_at: DateTime<Utc>) -> Result<ClosedLoan, ReturnLoanError> {
    match loan {
        Loan::Open(open) => Ok(ClosedLoan {
            core: open.core,
            returned_at,
        }),
        Loan::Closed(closed) => Err(ReturnLoanError::AlreadyReturned(closed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CopyCount, book::Book};
    use chrono::Duration;

    fn book_with_copies(total: i32) -> Book {
        Book {
            book_id: BookId::new(1),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            copies: CopyCount::new(total).unwrap(),
        }
    }

    #[test]
    fn test_issue_loan_creates_open_loan_and_decrements_copies() {
        let book = book_with_copies(2);
        let member_id = MemberId::new(100);
        let issued_at = Utc::now();

        let (loan, updated) = issue_loan(&book, member_id, issued_at).unwrap();

        assert_eq!(loan.book_id, book.book_id);
        assert_eq!(loan.member_id, member_id);
        assert_eq!(loan.issued_at, issued_at);
        assert_eq!(updated.copies.available(), 1);
        assert_eq!(updated.copies.total(), 2);
        assert!(updated.is_consistent_with(1));
    }

    #[test]
    fn test_issue_loan_generates_unique_ids() {
        let book = book_with_copies(2);
        let (first, book) = issue_loan(&book, MemberId::new(1), Utc::now()).unwrap();
        let (second, _) = issue_loan(&book, MemberId::new(1), Utc::now()).unwrap();
        assert_ne!(first.loan_id, second.loan_id);
    }

    #[test]
    fn test_issue_loan_fails_when_no_copies_available() {
        let book = book_with_copies(0);
        let result = issue_loan(&book, MemberId::new(100), Utc::now());
        assert_eq!(result.unwrap_err(), IssueLoanError::NoCopiesAvailable);
    }

    #[test]
    fn test_return_loan_closes_open_loan() {
        let book = book_with_copies(1);
        let issued_at = Utc::now();
        let (loan, _) = issue_loan(&book, MemberId::new(100), issued_at).unwrap();
        let returned_at = issued_at + Duration::days(3);

        let closed = return_loan(Loan::Open(loan.clone()), returned_at).unwrap();

        assert_eq!(closed.core, loan.core);
        assert_eq!(closed.returned_at, returned_at);
    }

    #[test]
    fn test_return_loan_fails_when_already_returned() {
        let book = book_with_copies(1);
        let issued_at = Utc::now();
        let (loan, _) = issue_loan(&book, MemberId::new(100), issued_at).unwrap();
        let first_return = issued_at + Duration::days(3);
        let closed = return_loan(Loan::Open(loan), first_return).unwrap();

        // 2回目の返却は失敗し、最初の返却日時は保持される
        let result = return_loan(Loan::Closed(closed.clone()), first_return + Duration::days(1));
        assert_eq!(result.unwrap_err(), ReturnLoanError::AlreadyReturned(closed));
    }

    #[test]
    fn test_loan_accessors() {
        let book = book_with_copies(1);
        let (open, _) = issue_loan(&book, MemberId::new(100), Utc::now()).unwrap();
        let loan = Loan::from(open.clone());
        assert!(loan.is_open());
        assert_eq!(loan.loan_id(), open.loan_id);
        assert_eq!(loan.returned_at(), None);

        let returned_at = Utc::now();
        let loan = Loan::from(return_loan(loan, returned_at).unwrap());
        assert!(!loan.is_open());
        assert_eq!(loan.returned_at(), Some(returned_at));
    }

    #[test]
    fn test_loan_serializes_with_status_tag() {
        let book = book_with_copies(1);
        let (open, _) = issue_loan(&book, MemberId::new(100), Utc::now()).unwrap();
        let json = serde_json::to_value(Loan::Open(open)).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["book_id"], 1);
        assert_eq!(json["member_id"], 100);
    }
}
