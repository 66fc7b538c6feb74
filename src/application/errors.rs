use crate::domain::ValidationError;
use thiserror::Error;

/// エラーが指すエンティティの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book,
    Member,
    Loan,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Book => "Book",
            Entity::Member => "Member",
            Entity::Loan => "Loan",
        };
        f.write_str(name)
    }
}

/// アプリケーション層のエラー
///
/// NotFound / DuplicateKey / InvalidArgument はいずれも回復可能で、
/// 呼び出し元（API層）が利用者に提示する。ストアのエラーのみがシステム障害。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 参照先が存在しない
    #[error("{0} not found: {1}")]
    NotFound(Entity, String),

    /// 一意キーの重複
    #[error("{0} already exists: {1}")]
    DuplicateKey(Entity, String),

    /// 入力値が不正・範囲外
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    CatalogStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MemberStoreのエラー
    #[error("Member store error")]
    MemberStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LoanLedgerStoreのエラー
    #[error("Loan ledger store error")]
    LedgerStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ValidationError> for ApplicationError {
    fn from(err: ValidationError) -> Self {
        ApplicationError::InvalidArgument(err.to_string())
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
