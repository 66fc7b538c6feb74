//! PostgreSQLアダプターのテスト
//!
//! 実データベースが必要なため既定では実行しない。
//! `DATABASE_URL`を設定して`cargo test -- --ignored`で実行する。

mod common;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use rusty_library_circulation::adapters::postgres::{
    PostgresCatalogStore, PostgresLoanLedgerStore, PostgresMemberStore,
};
use rusty_library_circulation::application::{self, IssueOutcome};
use rusty_library_circulation::domain::commands::IssueLoan;
use rusty_library_circulation::domain::*;
use rusty_library_circulation::ports::{CatalogStore, LoanLedgerStore, MemberStore};
use serial_test::serial;
use std::sync::Arc;

/// PostgreSQLの時刻精度（マイクロ秒）に合わせて丸める
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let micros = dt.timestamp_micros();
    DateTime::from_timestamp_micros(micros).expect("Invalid timestamp")
}

fn book(id: i64, title: &str, author: &str, total: i32) -> Book {
    Book {
        book_id: BookId::new(id),
        title: title.to_string(),
        author: author.to_string(),
        copies: CopyCount::new(total).unwrap(),
    }
}

fn member(id: i64) -> Member {
    Member {
        member_id: MemberId::new(id),
        name: format!("Student {}", id),
        department: "Physics".to_string(),
    }
}

fn open_loan(book_id: i64, member_id: i64) -> OpenLoan {
    OpenLoan {
        core: LoanCore {
            loan_id: LoanId::new(),
            book_id: BookId::new(book_id),
            member_id: MemberId::new(member_id),
            issued_at: truncate_to_micros(Utc::now()),
        },
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_catalog_insert_find_and_search() {
    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;
    let store = PostgresCatalogStore::new(pool.clone());

    assert!(store.insert(book(2, "The Hobbit", "J.R.R. Tolkien", 2)).await.unwrap());
    assert!(store.insert(book(1, "Dune", "Frank Herbert", 1)).await.unwrap());
    // 重複キーは既存の行を変更しない
    assert!(!store.insert(book(1, "Other", "Someone", 9)).await.unwrap());

    let found = store.find(BookId::new(1)).await.unwrap().unwrap();
    assert_eq!(found, book(1, "Dune", "Frank Herbert", 1));
    assert!(store.find(BookId::new(3)).await.unwrap().is_none());

    let all: Vec<Book> = store.stream_all().try_collect().await.unwrap();
    assert_eq!(
        all.iter().map(|b| b.book_id.value()).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let hits: Vec<Book> = store.search("TOLKIEN").try_collect().await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "The Hobbit");

    // LIKEのワイルドカードは文字として扱う
    let hits: Vec<Book> = store.search("%").try_collect().await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_member_insert_and_stream() {
    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;
    let store = PostgresMemberStore::new(pool.clone());

    assert!(store.insert(member(200)).await.unwrap());
    assert!(store.insert(member(100)).await.unwrap());
    assert!(!store.insert(member(100)).await.unwrap());

    assert_eq!(store.find(MemberId::new(200)).await.unwrap(), Some(member(200)));

    let all: Vec<Member> = store.stream_all().try_collect().await.unwrap();
    assert_eq!(
        all.iter().map(|m| m.member_id.value()).collect::<Vec<_>>(),
        vec![100, 200]
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_ledger_open_and_close_keep_counts() {
    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;
    let catalog = PostgresCatalogStore::new(pool.clone());
    let members = PostgresMemberStore::new(pool.clone());
    let ledger = PostgresLoanLedgerStore::new(pool.clone());

    catalog.insert(book(1, "Dune", "Frank Herbert", 1)).await.unwrap();
    members.insert(member(100)).await.unwrap();

    let loan = open_loan(1, 100);
    assert!(ledger.open(&loan).await.unwrap());
    // 在庫がないので2件目は記録されない
    assert!(!ledger.open(&open_loan(1, 100)).await.unwrap());

    let copies = catalog.find(BookId::new(1)).await.unwrap().unwrap().copies;
    assert_eq!(copies.available(), 0);

    let stored = ledger.find(loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored, Loan::Open(loan.clone()));

    let closed = ClosedLoan {
        core: loan.core.clone(),
        returned_at: truncate_to_micros(Utc::now()),
    };
    assert!(ledger.close(&closed).await.unwrap());
    assert!(!ledger.close(&closed).await.unwrap());

    let copies = catalog.find(BookId::new(1)).await.unwrap().unwrap().copies;
    assert_eq!(copies.available(), 1);

    let open: Vec<Loan> = ledger.stream_open().try_collect().await.unwrap();
    let all: Vec<Loan> = ledger.stream_all().try_collect().await.unwrap();
    assert!(open.is_empty());
    assert_eq!(all, vec![Loan::Closed(closed)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_concurrent_issues_never_oversubscribe() {
    const COPIES: i32 = 2;
    const ATTEMPTS: i64 = 10;

    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;
    let deps = Arc::new(common::postgres_deps(&pool));

    deps.catalog_store
        .insert(book(1, "Dune", "Frank Herbert", COPIES))
        .await
        .unwrap();
    deps.member_store.insert(member(100)).await.unwrap();

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let deps = Arc::clone(&deps);
            tokio::spawn(async move {
                application::issue_loan(
                    &deps,
                    IssueLoan {
                        book_id: BookId::new(1),
                        member_id: MemberId::new(100),
                        issued_at: Utc::now(),
                    },
                )
                .await
                .unwrap()
            })
        })
        .collect();

    let mut issued = 0;
    for handle in handles {
        if let IssueOutcome::Issued(_) = handle.await.unwrap() {
            issued += 1;
        }
    }

    assert_eq!(issued, COPIES);
    let book = application::find_book(&deps, BookId::new(1)).await.unwrap();
    assert_eq!(book.copies.available(), 0);
}
