use crate::domain::{self, Book, BookId, commands::AddBook};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};

use super::ServiceDependencies;
use super::errors::{ApplicationError, Entity, Result};

/// 書籍を登録する
///
/// ビジネスルール：
/// - BookIDが未登録であること（重複時は既存レコードを変更しない）
/// - 総冊数は0以上、タイトル・著者は空でないこと
/// - 登録時の貸出可能数は総冊数と同じ
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    // 1. ストア境界で検証
    let book = domain::book::add_book(cmd)?;

    // 2. 一意性はストアの条件付き挿入で保証する
    let inserted = deps
        .catalog_store
        .insert(book.clone())
        .await
        .map_err(ApplicationError::CatalogStoreError)?;

    if !inserted {
        return Err(ApplicationError::DuplicateKey(
            Entity::Book,
            book.book_id.to_string(),
        ));
    }

    tracing::info!(book_id = %book.book_id, total_copies = book.copies.total(), "book added");
    Ok(book)
}

/// IDで書籍を取得する
pub async fn find_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.catalog_store
        .find(book_id)
        .await
        .map_err(ApplicationError::CatalogStoreError)?
        .ok_or_else(|| ApplicationError::NotFound(Entity::Book, book_id.to_string()))
}

/// すべての書籍（遅延・再開可能なストリーム）
pub fn list_books(deps: &ServiceDependencies) -> BoxStream<'_, Result<Book>> {
    deps.catalog_store
        .stream_all()
        .map_err(ApplicationError::CatalogStoreError)
        .boxed()
}

/// タイトル・著者の部分一致検索（大文字小文字を区別しない）
pub fn search_books<'a>(deps: &'a ServiceDependencies, query: &str) -> BoxStream<'a, Result<Book>> {
    deps.catalog_store
        .search(query.trim())
        .map_err(ApplicationError::CatalogStoreError)
        .boxed()
}
