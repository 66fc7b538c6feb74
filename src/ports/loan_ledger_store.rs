use crate::domain::{ClosedLoan, Loan, LoanId, OpenLoan};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出台帳ストアポート
///
/// 貸出レコードと書籍の貸出可能数を**1つの単位として**更新する。
/// 実装は、外部の読み手が片方だけ反映された状態を観測できないことを保証すること
/// （トランザクション、または単一ロック内での更新）。
#[async_trait]
pub trait LoanLedgerStore: Send + Sync {
    /// 貸出を記録し、書籍の貸出可能数を1減らす
    ///
    /// 貸出可能数の減算は`available > 0`を条件とする。
    /// 条件に合わなかった場合（同時実行で在庫を取られた場合を含む）は
    /// 何も書き込まずに`false`を返す。
    async fn open(&self, loan: &OpenLoan) -> Result<bool>;

    /// 貸出を返却済みにし、書籍の貸出可能数を1増やす
    ///
    /// 返却日時の設定は未返却であることを条件とする。
    /// 既に返却済みだった場合は何も書き込まずに`false`を返す。
    async fn close(&self, loan: &ClosedLoan) -> Result<bool>;

    /// IDで貸出を取得する
    async fn find(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 未返却の貸出をストリーム配信する（記録順）
    ///
    /// 返却処理の画面で使用される。
    fn stream_open(&self) -> BoxStream<'_, Result<Loan>>;

    /// すべての貸出をストリーム配信する（記録順）
    fn stream_all(&self) -> BoxStream<'_, Result<Loan>>;
}
