use serde::Serialize;

use super::{BookId, CopyCount, ValidationError, commands::AddBook};

/// Book集約 - 1タイトル分の蔵書
///
/// 貸出可能数は貸出台帳からのみ変更される。削除操作は存在しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub copies: CopyCount,
}

impl Book {
    /// タイトルまたは著者に検索語が含まれるか（大文字小文字を区別しない部分一致）
    ///
    /// 空の検索語はすべての書籍に一致する。
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle) || self.author.to_lowercase().contains(&needle)
    }

    /// 蔵書数と未返却の貸出件数が整合しているか
    ///
    /// available + open_loans == total
    pub fn is_consistent_with(&self, open_loans: usize) -> bool {
        i64::from(self.copies.available()) + open_loans as i64 == i64::from(self.copies.total())
    }
}

/// 純粋関数：書籍を登録する
///
/// ビジネスルール：
/// - タイトルと著者は空でないこと（前後の空白は除去）
/// - 総冊数は0以上
/// - 登録時は全冊が貸出可能
pub fn add_book(cmd: AddBook) -> Result<Book, ValidationError> {
    let title = require_text("title", &cmd.title)?;
    let author = require_text("author", &cmd.author)?;
    let copies = CopyCount::new(cmd.total_copies)?;

    Ok(Book {
        book_id: cmd.book_id,
        title,
        author,
        copies,
    })
}

pub(super) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> AddBook {
        AddBook {
            book_id: BookId::new(1),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            total_copies: 2,
        }
    }

    #[test]
    fn test_add_book_sets_available_to_total() {
        let book = add_book(dune()).unwrap();
        assert_eq!(book.book_id, BookId::new(1));
        assert_eq!(book.copies.total(), 2);
        assert_eq!(book.copies.available(), 2);
    }

    #[test]
    fn test_add_book_trims_text() {
        let book = add_book(AddBook {
            title: "  Dune ".to_string(),
            ..dune()
        })
        .unwrap();
        assert_eq!(book.title, "Dune");
    }

    #[test]
    fn test_add_book_rejects_negative_copies() {
        let result = add_book(AddBook {
            total_copies: -1,
            ..dune()
        });
        assert_eq!(result.unwrap_err(), ValidationError::NegativeTotalCopies);
    }

    #[test]
    fn test_add_book_rejects_blank_title() {
        let result = add_book(AddBook {
            title: "   ".to_string(),
            ..dune()
        });
        assert_eq!(result.unwrap_err(), ValidationError::Blank("title"));
    }

    #[test]
    fn test_matches_author_case_insensitively() {
        let book = add_book(AddBook {
            author: "J.R.R. Tolkien".to_string(),
            title: "The Hobbit".to_string(),
            ..dune()
        })
        .unwrap();
        assert!(book.matches("tolkien"));
        assert!(book.matches("HOBBIT"));
        assert!(!book.matches("herbert"));
    }

    #[test]
    fn test_matches_empty_query_matches_everything() {
        let book = add_book(dune()).unwrap();
        assert!(book.matches(""));
        assert!(book.matches("   "));
    }

    #[test]
    fn test_matches_treats_regex_metacharacters_literally() {
        let book = add_book(dune()).unwrap();
        assert!(!book.matches("D.ne"));
        assert!(!book.matches(".*"));
    }

    #[test]
    fn test_is_consistent_with_open_loans() {
        let book = add_book(dune()).unwrap();
        assert!(book.is_consistent_with(0));
        assert!(!book.is_consistent_with(1));

        let book = Book {
            copies: book.copies.checkout().unwrap(),
            ..book
        };
        assert!(book.is_consistent_with(1));
    }
}
