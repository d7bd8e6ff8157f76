use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::requests::ValidationError;
use crate::api::responses::{ErrorResponse, ValidationErrorDetail};
use crate::error::AppError;

/// Boundary error: either a request-shape problem caught before the engine
/// runs, or a typed engine error to translate.
pub enum ApiError {
    Validation(Vec<ValidationError>),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let details: Vec<ValidationErrorDetail> = errors
                    .into_iter()
                    .map(|e| ValidationErrorDetail {
                        field: e.field,
                        message: e.message,
                    })
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(
                        ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                            .with_details(details),
                    ),
                )
                    .into_response()
            }
            ApiError::App(err) => {
                let status = match &err {
                    AppError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
                    AppError::WalletNotFound { .. }
                    | AppError::AccountNotFound(_)
                    | AppError::AssetTypeNotFound(_) => StatusCode::NOT_FOUND,
                    AppError::IdempotencyConflict(_)
                    | AppError::UsernameTaken
                    | AppError::EmailTaken => StatusCode::CONFLICT,
                    AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AppError::NegativeBalance { .. }
                    | AppError::DuplicateRace(_)
                    | AppError::Database(_)
                    | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, "request failed");
                    match &err {
                        // The invariant-bug message is diagnostic; keep it.
                        AppError::NegativeBalance { .. } => err.to_string(),
                        _ => "An internal error occurred".to_string(),
                    }
                } else {
                    err.to_string()
                };

                (status, Json(ErrorResponse::new(err.code(), message))).into_response()
            }
        }
    }
}
