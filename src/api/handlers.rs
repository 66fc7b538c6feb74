use crate::application::{
    IssueOutcome, ServiceDependencies, add_book as execute_add_book, find_book, find_loan,
    find_member, issue_loan as execute_issue_loan, list_all_loans, list_books, list_members,
    list_open_loans, register_member as execute_register_member,
    return_loan as execute_return_loan, search_books as execute_search_books,
};
use crate::domain::{BookId, LoanId, MemberId, commands::ReturnLoan};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use futures::TryStreamExt;
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        AddBookForm, BookResponse, IssueLoanForm, IssueResponse, ListLoansQuery, LoanResponse,
        LoanStatusFilter, RegisterStudentForm, ReturnLoanForm, ReturnResponse, SearchQuery,
        StudentResponse, parse_field, parse_loan_id,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Catalog
// ============================================================================

/// POST /books - 書籍を登録
///
/// 同じbook_idが登録済みの場合は409を返し、既存の書籍は変更しない。
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddBookForm>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let cmd = form.to_command()?;
    let book = execute_add_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /books - 書籍一覧（book_id昇順）
pub async fn list_all_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = list_books(&state.service_deps)
        .map_ok(BookResponse::from)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(books))
}

/// GET /books/search?q= - タイトル・著者の部分一致検索（大文字小文字を区別しない）
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let q = query.q.unwrap_or_default();

    let books = execute_search_books(&state.service_deps, &q)
        .map_ok(BookResponse::from)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(books))
}

/// GET /books/:book_id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = BookId::new(parse_field("book_id", &book_id)?);
    let book = find_book(&state.service_deps, book_id).await?;

    Ok(Json(BookResponse::from(book)))
}

// ============================================================================
// Students
// ============================================================================

/// POST /students - 学生を登録
pub async fn register_student(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterStudentForm>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let cmd = form.to_command()?;
    let member = execute_register_member(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(member))))
}

/// GET /students
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = list_members(&state.service_deps)
        .map_ok(StudentResponse::from)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(students))
}

/// GET /students/:student_id
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let member_id = MemberId::new(parse_field("student_id", &student_id)?);
    let member = find_member(&state.service_deps, member_id).await?;

    Ok(Json(StudentResponse::from(member)))
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans - 書籍を貸し出す
///
/// 貸出できた場合は201、貸出可能数が0の場合は何も記録せず200で
/// `rejected`を返す。
pub async fn issue_loan(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IssueLoanForm>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let cmd = form.to_command(chrono::Utc::now())?;
    let outcome = execute_issue_loan(&state.service_deps, cmd).await?;

    let status = match outcome {
        IssueOutcome::Issued(_) => StatusCode::CREATED,
        IssueOutcome::Rejected(_) => StatusCode::OK,
    };

    Ok((status, Json(IssueResponse::from(outcome))))
}

/// POST /loans/:loan_id/return - 書籍を返却
///
/// 返却済みの貸出に対しては何も変更せず`already_returned`を返す。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<ReturnResponse>, ApiError> {
    let loan_id = parse_loan_id("loan_id", &loan_id)?;
    process_return(&state, loan_id).await
}

/// POST /returns - フォームのissue_idで書籍を返却
pub async fn return_by_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ReturnLoanForm>,
) -> Result<Json<ReturnResponse>, ApiError> {
    let loan_id = parse_loan_id("issue_id", &form.issue_id)?;
    process_return(&state, loan_id).await
}

async fn process_return(state: &AppState, loan_id: LoanId) -> Result<Json<ReturnResponse>, ApiError> {
    let cmd = ReturnLoan {
        loan_id,
        returned_at: chrono::Utc::now(),
    };
    let outcome = execute_return_loan(&state.service_deps, cmd).await?;

    Ok(Json(ReturnResponse::from(outcome)))
}

/// GET /loans?status=open|closed|all - 貸出一覧（記録順）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let filter = match query.status.as_deref() {
        Some(status) => status.parse::<LoanStatusFilter>()?,
        None => LoanStatusFilter::All,
    };

    let loans = match filter {
        LoanStatusFilter::Open => list_open_loans(&state.service_deps),
        _ => list_all_loans(&state.service_deps),
    };

    let loans = loans
        .try_filter(|loan| futures::future::ready(filter.accepts(loan)))
        .map_ok(LoanResponse::from)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(loans))
}

/// GET /loans/:loan_id
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan_id = parse_loan_id("loan_id", &loan_id)?;
    let loan = find_loan(&state.service_deps, loan_id).await?;

    Ok(Json(LoanResponse::from(loan)))
}
