use crate::domain::{Book, BookId};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書ストアポート
///
/// 書籍レコードの永続化を抽象化する。
/// 貸出可能数の増減は貸出台帳ストアが行い、このポートからは変更しない。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 書籍を追加する
    ///
    /// 同じBookIDが既に存在する場合は何も変更せず`false`を返す。
    async fn insert(&self, book: Book) -> Result<bool>;

    /// IDで書籍を取得する
    async fn find(&self, book_id: BookId) -> Result<Option<Book>>;

    /// すべての書籍をストリーム配信する
    ///
    /// 呼び出すたびに新しいストリームを返す（再開可能）。BookIDの昇順。
    fn stream_all(&self) -> BoxStream<'_, Result<Book>>;

    /// タイトルまたは著者に検索語を含む書籍をストリーム配信する
    ///
    /// 大文字小文字を区別しない部分一致。正規表現としては解釈しない。
    /// 空の検索語はすべての書籍に一致する。
    fn search(&self, query: &str) -> BoxStream<'_, Result<Book>>;
}
