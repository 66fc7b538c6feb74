use crate::domain::{Book, BookId};
use crate::ports::catalog_store::{CatalogStore, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::InMemoryStore;

#[async_trait]
impl CatalogStore for InMemoryStore {
    /// Insert unless the BookID is already taken
    async fn insert(&self, book: Book) -> Result<bool> {
        let mut state = self.lock()?;
        if state.books.contains_key(&book.book_id) {
            return Ok(false);
        }
        state.books.insert(book.book_id, book);
        Ok(true)
    }

    async fn find(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Book>> {
        self.snapshot(|state| state.books.values().cloned().collect())
    }

    fn search(&self, query: &str) -> BoxStream<'_, Result<Book>> {
        self.snapshot(|state| {
            state
                .books
                .values()
                .filter(|book| book.matches(query))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CopyCount;
    use futures::TryStreamExt;

    fn book(id: i64, title: &str, author: &str) -> Book {
        Book {
            book_id: BookId::new(id),
            title: title.to_string(),
            author: author.to_string(),
            copies: CopyCount::new(1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_and_keeps_original() {
        let store = InMemoryStore::new();
        assert!(store.insert(book(1, "Dune", "Herbert")).await.unwrap());
        assert!(!store.insert(book(1, "Other", "Someone")).await.unwrap());

        let stored = store.find(BookId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.title, "Dune");
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.find(BookId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stream_all_is_restartable_and_ordered() {
        let store = InMemoryStore::new();
        store.insert(book(2, "B", "x")).await.unwrap();
        store.insert(book(1, "A", "y")).await.unwrap();

        let first: Vec<Book> = store.stream_all().try_collect().await.unwrap();
        let second: Vec<Book> = store.stream_all().try_collect().await.unwrap();

        assert_eq!(first, second);
        let ids: Vec<i64> = first.iter().map(|b| b.book_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_author() {
        let store = InMemoryStore::new();
        store.insert(book(1, "The Hobbit", "J.R.R. Tolkien")).await.unwrap();
        store.insert(book(2, "Dune", "Frank Herbert")).await.unwrap();

        let found: Vec<Book> = store.search("tolkien").try_collect().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].book_id, BookId::new(1));

        let found: Vec<Book> = store.search("DUNE").try_collect().await.unwrap();
        assert_eq!(found.len(), 1);

        let found: Vec<Book> = store.search("").try_collect().await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
