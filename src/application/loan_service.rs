use crate::domain::{
    self, ClosedLoan, IssueLoanError, Loan, LoanId, OpenLoan, ReturnLoanError, commands::*,
};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use super::ServiceDependencies;
use super::catalog_service::find_book;
use super::errors::{ApplicationError, Entity, Result};
use super::member_service::find_member;

/// 貸出が見送られた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueRejection {
    /// 貸出可能な冊数がない
    NoCopiesAvailable,
}

/// 貸出処理の結果
///
/// 在庫切れはエラーではなく、明示的な結果として返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// 貸出を記録した
    Issued(OpenLoan),
    /// 何も記録しなかった（貸出も蔵書数も変化なし）
    Rejected(IssueRejection),
}

/// 返却処理の結果
///
/// 二重返却はエラーではなく、何も変更しない結果として返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// 今回の呼び出しで返却を記録した
    Returned(ClosedLoan),
    /// 既に返却済みだった（状態は変化なし）
    AlreadyReturned(ClosedLoan),
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること（NotFound）
/// - 会員が存在すること（NotFound）
/// - 貸出可能数が1以上であること（不足時は`Rejected`、エラーではない）
///
/// # 一貫性保証
///
/// 貸出レコードの作成と貸出可能数の減算は、`LoanLedgerStore::open`が
/// 1つの単位として適用する。減算は`available > 0`の条件付きで行われるため、
/// 同じ書籍に対する同時呼び出しでも貸出可能数が負になることはない。
/// 読み込み後に在庫を他の呼び出しに取られた場合も`Rejected`となる。
pub async fn issue_loan(deps: &ServiceDependencies, cmd: IssueLoan) -> Result<IssueOutcome> {
    // 1. 書籍の存在確認
    let book = find_book(deps, cmd.book_id).await?;

    // 2. 会員の存在確認
    find_member(deps, cmd.member_id).await?;

    // 3. ドメイン層の純粋関数を呼び出し
    let loan = match domain::loan::issue_loan(&book, cmd.member_id, cmd.issued_at) {
        Ok((loan, _)) => loan,
        Err(IssueLoanError::NoCopiesAvailable) => {
            tracing::info!(
                book_id = %cmd.book_id,
                member_id = %cmd.member_id,
                "issue rejected: no copies available"
            );
            return Ok(IssueOutcome::Rejected(IssueRejection::NoCopiesAvailable));
        }
    };

    // 4. 台帳に記録（貸出作成 + 条件付き減算）
    let opened = deps
        .loan_ledger_store
        .open(&loan)
        .await
        .map_err(ApplicationError::LedgerStoreError)?;

    if !opened {
        tracing::info!(
            book_id = %cmd.book_id,
            member_id = %cmd.member_id,
            "issue rejected: last copy taken concurrently"
        );
        return Ok(IssueOutcome::Rejected(IssueRejection::NoCopiesAvailable));
    }

    tracing::info!(
        loan_id = %loan.loan_id,
        book_id = %loan.book_id,
        member_id = %loan.member_id,
        "book issued"
    );
    Ok(IssueOutcome::Issued(loan))
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること（NotFound）
/// - 既に返却済みなら何もしない（`AlreadyReturned`、エラーではない）
///
/// # 一貫性保証
///
/// 返却日時の設定と貸出可能数の加算は`LoanLedgerStore::close`が
/// 1つの単位として適用する。返却日時の設定は未返却を条件とするため、
/// 同じ貸出の同時返却でも加算は1回だけ行われる。
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<ReturnOutcome> {
    // 1. 台帳から貸出を取得
    let loan = find_loan(deps, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let closed = match domain::loan::return_loan(loan, cmd.returned_at) {
        Ok(closed) => closed,
        Err(ReturnLoanError::AlreadyReturned(closed)) => {
            tracing::debug!(loan_id = %cmd.loan_id, "return ignored: already returned");
            return Ok(ReturnOutcome::AlreadyReturned(closed));
        }
    };

    // 3. 台帳に記録（返却日時の設定 + 加算）
    let closed_now = deps
        .loan_ledger_store
        .close(&closed)
        .await
        .map_err(ApplicationError::LedgerStoreError)?;

    if !closed_now {
        // 同時に別の返却が記録された。その結果を返す
        return match find_loan(deps, cmd.loan_id).await? {
            Loan::Closed(existing) => Ok(ReturnOutcome::AlreadyReturned(existing)),
            Loan::Open(_) => Err(ApplicationError::LedgerStoreError(
                format!("loan {} could not be closed", cmd.loan_id).into(),
            )),
        };
    }

    tracing::info!(
        loan_id = %closed.loan_id,
        book_id = %closed.book_id,
        member_id = %closed.member_id,
        "book returned"
    );
    Ok(ReturnOutcome::Returned(closed))
}

/// IDで貸出を取得する
pub async fn find_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_ledger_store
        .find(loan_id)
        .await
        .map_err(ApplicationError::LedgerStoreError)?
        .ok_or_else(|| ApplicationError::NotFound(Entity::Loan, loan_id.to_string()))
}

/// 未返却の貸出一覧（返却処理の画面用）
pub fn list_open_loans(deps: &ServiceDependencies) -> BoxStream<'_, Result<Loan>> {
    deps.loan_ledger_store
        .stream_open()
        .map_err(ApplicationError::LedgerStoreError)
        .boxed()
}

/// すべての貸出一覧（返却済みを含む）
pub fn list_all_loans(deps: &ServiceDependencies) -> BoxStream<'_, Result<Loan>> {
    deps.loan_ledger_store
        .stream_all()
        .map_err(ApplicationError::LedgerStoreError)
        .boxed()
}
