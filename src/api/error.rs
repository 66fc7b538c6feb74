use crate::application::{ApplicationError, Entity};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            ApplicationError::NotFound(entity, _) => {
                let error_type = match entity {
                    Entity::Book => "BOOK_NOT_FOUND",
                    Entity::Member => "STUDENT_NOT_FOUND",
                    Entity::Loan => "LOAN_NOT_FOUND",
                };
                (StatusCode::NOT_FOUND, error_type, self.0.to_string())
            }

            // 409 Conflict - 既に登録済み
            ApplicationError::DuplicateKey(..) => {
                (StatusCode::CONFLICT, "DUPLICATE_KEY", self.0.to_string())
            }

            // 400 Bad Request - 入力値の形式・範囲が不正
            ApplicationError::InvalidArgument(ref msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg.clone())
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::CatalogStoreError(ref e) => {
                tracing::error!("Catalog store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_STORE_ERROR",
                    "Failed to access the catalog".to_string(),
                )
            }
            ApplicationError::MemberStoreError(ref e) => {
                tracing::error!("Member store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MEMBER_STORE_ERROR",
                    "Failed to access student records".to_string(),
                )
            }
            ApplicationError::LedgerStoreError(ref e) => {
                tracing::error!("Loan ledger store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LEDGER_STORE_ERROR",
                    "Failed to access the loan ledger".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
