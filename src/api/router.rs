use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, get_book, get_loan, get_student, issue_loan, list_all_books, list_loans,
    list_students, register_student, return_by_form, return_loan, search_books,
};

/// Creates the API router with all circulation endpoints
///
/// Catalog:
/// - GET/POST /books, GET /books/search, GET /books/:book_id
///
/// Students:
/// - GET/POST /students, GET /students/:student_id
///
/// Loans:
/// - GET/POST /loans, GET /loans/:loan_id
/// - POST /loans/:loan_id/return, POST /returns
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", get(list_all_books).post(add_book))
        .route("/books/search", get(search_books))
        .route("/books/:book_id", get(get_book))
        .route("/students", get(list_students).post(register_student))
        .route("/students/:student_id", get(get_student))
        .route("/loans", get(list_loans).post(issue_loan))
        .route("/loans/:loan_id", get(get_loan))
        .route("/loans/:loan_id/return", post(return_loan))
        .route("/returns", post(return_by_form))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
