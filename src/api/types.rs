use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::application::{ApplicationError, IssueOutcome, IssueRejection, ReturnOutcome};
use crate::domain::{Book, BookId, Loan, LoanId, Member, MemberId, commands::*};

// ============================================================================
// Requests
// ============================================================================
//
// フォーム値はすべて文字列で受け取り、ここで型に変換する。
// 欠落・不正な値はaxumの拒否ではなく`INVALID_ARGUMENT`として返す。

/// POST /books
#[derive(Debug, Deserialize)]
pub struct AddBookForm {
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub total_copies: String,
}

impl AddBookForm {
    pub fn to_command(&self) -> Result<AddBook, ApplicationError> {
        Ok(AddBook {
            book_id: BookId::new(parse_field("book_id", &self.book_id)?),
            title: self.title.clone(),
            author: self.author.clone(),
            total_copies: parse_field("total_copies", &self.total_copies)?,
        })
    }
}

/// POST /students
#[derive(Debug, Deserialize)]
pub struct RegisterStudentForm {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
}

impl RegisterStudentForm {
    pub fn to_command(&self) -> Result<RegisterMember, ApplicationError> {
        Ok(RegisterMember {
            member_id: MemberId::new(parse_field("student_id", &self.student_id)?),
            name: self.name.clone(),
            department: self.department.clone(),
        })
    }
}

/// POST /loans
#[derive(Debug, Deserialize)]
pub struct IssueLoanForm {
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub student_id: String,
}

impl IssueLoanForm {
    pub fn to_command(&self, issued_at: DateTime<Utc>) -> Result<IssueLoan, ApplicationError> {
        Ok(IssueLoan {
            book_id: BookId::new(parse_field("book_id", &self.book_id)?),
            member_id: MemberId::new(parse_field("student_id", &self.student_id)?),
            issued_at,
        })
    }
}

/// POST /returns
#[derive(Debug, Deserialize)]
pub struct ReturnLoanForm {
    #[serde(default)]
    pub issue_id: String,
}

/// GET /books/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /loans
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// open / closed / all（省略時はall）
    pub status: Option<String>,
}

/// 貸出一覧のステータスフィルタ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatusFilter {
    Open,
    Closed,
    All,
}

impl LoanStatusFilter {
    pub fn accepts(&self, loan: &Loan) -> bool {
        match self {
            LoanStatusFilter::Open => loan.is_open(),
            LoanStatusFilter::Closed => !loan.is_open(),
            LoanStatusFilter::All => true,
        }
    }
}

impl FromStr for LoanStatusFilter {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(LoanStatusFilter::Open),
            "closed" => Ok(LoanStatusFilter::Closed),
            "" | "all" => Ok(LoanStatusFilter::All),
            other => Err(ApplicationError::InvalidArgument(format!(
                "status must be one of open, closed, all (got '{}')",
                other
            ))),
        }
    }
}

/// 文字列の入力値を数値に変換する
pub fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, ApplicationError> {
    value.trim().parse::<T>().map_err(|_| {
        ApplicationError::InvalidArgument(format!(
            "{} must be an integer (got '{}')",
            field, value
        ))
    })
}

/// 文字列の入力値を貸出IDに変換する
pub fn parse_loan_id(field: &str, value: &str) -> Result<LoanId, ApplicationError> {
    Uuid::parse_str(value.trim())
        .map(LoanId::from_uuid)
        .map_err(|_| {
            ApplicationError::InvalidArgument(format!(
                "{} must be a loan UUID (got '{}')",
                field, value
            ))
        })
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            total_copies: book.copies.total(),
            available_copies: book.copies.available(),
            title: book.title,
            author: book.author,
        }
    }
}

/// 学生（会員）レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student_id: i64,
    pub name: String,
    pub department: String,
}

impl From<Member> for StudentResponse {
    fn from(member: Member) -> Self {
        Self {
            student_id: member.member_id.value(),
            name: member.name,
            department: member.department,
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: i64,
    pub student_id: i64,
    pub issued_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let core = loan.core();
        Self {
            loan_id: core.loan_id.value(),
            book_id: core.book_id.value(),
            student_id: core.member_id.value(),
            issued_at: core.issued_at,
            returned_at: loan.returned_at(),
            status: if loan.is_open() { "open" } else { "closed" }.to_string(),
        }
    }
}

/// POST /loans のレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssueResponse {
    Issued { loan: LoanResponse },
    Rejected { reason: IssueRejection },
}

impl From<IssueOutcome> for IssueResponse {
    fn from(outcome: IssueOutcome) -> Self {
        match outcome {
            IssueOutcome::Issued(loan) => IssueResponse::Issued {
                loan: Loan::from(loan).into(),
            },
            IssueOutcome::Rejected(reason) => IssueResponse::Rejected { reason },
        }
    }
}

/// 返却処理の結果種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Returned,
    AlreadyReturned,
}

/// POST /loans/:loan_id/return と POST /returns のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ReturnResponse {
    pub outcome: ReturnStatus,
    pub loan: LoanResponse,
}

impl From<ReturnOutcome> for ReturnResponse {
    fn from(outcome: ReturnOutcome) -> Self {
        let (outcome, loan) = match outcome {
            ReturnOutcome::Returned(loan) => (ReturnStatus::Returned, loan),
            ReturnOutcome::AlreadyReturned(loan) => (ReturnStatus::AlreadyReturned, loan),
        };
        Self {
            outcome,
            loan: Loan::from(loan).into(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
