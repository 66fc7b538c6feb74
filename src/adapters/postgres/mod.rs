pub mod catalog_store;
pub mod loan_ledger_store;
pub mod member_store;

use crate::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

// パブリックに型を再エクスポート
pub use catalog_store::CatalogStore as PostgresCatalogStore;
pub use loan_ledger_store::LoanLedgerStore as PostgresLoanLedgerStore;
pub use member_store::MemberStore as PostgresMemberStore;

/// Open the shared connection pool and bring the schema up to date
///
/// The pool is created once at startup and closed on shutdown.
pub async fn connect(
    config: &DatabaseConfig,
) -> Result<PgPool, Box<dyn std::error::Error + Send + Sync>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Build an `InvalidData` error for rows that violate the domain invariants
pub(crate) fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}
