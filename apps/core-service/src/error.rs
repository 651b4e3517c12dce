//! # Core Service エラー定義
//!
//! Core Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! エラーレスポンスの形状は RFC 9457 Problem Details
//! （[`sellotur_shared::ErrorResponse`]）に統一する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sellotur_domain::DomainError;
use sellotur_infra::{InfraError, db::TransientError};
use sellotur_shared::ErrorResponse;
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 権限不足
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl CoreError {
    /// ドメイン層の検証エラーをリクエスト系エラーに変換する
    pub fn from_domain(error: DomainError) -> Self {
        match error {
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
            DomainError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type}(id={id})"))
            }
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::UnsupportedRole(role) => {
                Self::BadRequest(format!("未対応のロールです: {role}"))
            }
            DomainError::UnknownStage(text) => {
                // 保存データの破損はクライアント起因ではない
                Self::Internal(format!("ステータステキストを復号できません: {text}"))
            }
        }
    }
}

impl TransientError for CoreError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Database(error) => error.is_transient(),
            _ => false,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CoreError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg.clone()))
            }
            CoreError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::bad_request(msg.clone()),
            ),
            CoreError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorResponse::forbidden(msg.clone()))
            }
            CoreError::Database(error) => {
                tracing::error!(%error, span_trace = %error.span_trace(), "データベースエラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error("内部エラーが発生しました"),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!("内部エラー: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error("内部エラーが発生しました"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
