use super::{ClosedLoan, CopyCountError};

/// 入力値のエラー（書籍登録・会員登録）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 必須の文字列項目が空
    Blank(&'static str),
    /// 総冊数が負
    NegativeTotalCopies,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Blank(field) => write!(f, "{} must not be blank", field),
            ValidationError::NegativeTotalCopies => write!(f, "total_copies must be >= 0"),
        }
    }
}

impl From<CopyCountError> for ValidationError {
    fn from(_: CopyCountError) -> Self {
        ValidationError::NegativeTotalCopies
    }
}

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueLoanError {
    /// 貸出可能な冊数がない
    NoCopiesAvailable,
}

impl From<CopyCountError> for IssueLoanError {
    fn from(_: CopyCountError) -> Self {
        IssueLoanError::NoCopiesAvailable
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み（返却済みの貸出をそのまま持ち帰る）
    AlreadyReturned(ClosedLoan),
}
