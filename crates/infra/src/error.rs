//! # インフラ層エラー定義
//!
//! データベースとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: sqlx::Error をラップし、ドメインエラーと分離する
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//! - **一時的障害の判定**: [`InfraError::is_transient`] により
//!   リトライ対象（接続断・デッドロック・直列化失敗）を機械的に識別する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
/// `From<sqlx::Error>` 等の変換や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// API 層でこのエラー種別に応じて適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラー、制約違反など。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// クライアント入力エラー
    ///
    /// インフラ層で検出されるが、原因はクライアント入力にある。
    #[error("入力エラー: {0}")]
    InvalidInput(String),

    /// 予期しないエラー
    ///
    /// 上記に分類できない予期しないエラー。
    /// 永続化されたデータが復号できない場合（ステータステキストの破損など）も含む。
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// InfraError を分解して InfraErrorKind と SpanTrace を取り出す
    pub fn into_parts(self) -> (InfraErrorKind, SpanTrace) {
        (self.kind, self.span_trace)
    }

    /// InfraErrorKind と SpanTrace から InfraError を組み立てる
    pub fn from_parts(kind: InfraErrorKind, span_trace: SpanTrace) -> Self {
        Self { kind, span_trace }
    }

    /// 一時的障害（リトライで解消しうるエラー）か
    ///
    /// 接続断・プールタイムアウトと、PostgreSQL の直列化失敗（`40001`）・
    /// デッドロック検出（`40P01`）を一時的障害とみなす。
    /// 制約違反や構文エラーは何度実行しても失敗するため対象外。
    pub fn is_transient(&self) -> bool {
        match &self.kind {
            InfraErrorKind::Database(error) => match error {
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
                sqlx::Error::Database(db_error) => {
                    matches!(db_error.code().as_deref(), Some("40001" | "40P01"))
                }
                _ => false,
            },
            InfraErrorKind::InvalidInput(_) | InfraErrorKind::Unexpected(_) => false,
        }
    }

    // ===== Convenience constructors =====

    /// クライアント入力エラーを生成する
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::InvalidInput(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Database(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    /// テスト用に ErrorLayer 付き subscriber を設定する
    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[test]
    fn test_from_sqlx_errorでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("proceso_repo", process_id = "test");
            let _entered = span.enter();

            let error = InfraError::from(sqlx::Error::RowNotFound);

            assert!(matches!(error.kind(), InfraErrorKind::Database(_)));
            // SpanTrace がキャプチャされている（空でも panic しないこと）
            let _ = format!("{}", error.span_trace());
        });
    }

    #[test]
    fn test_接続断エラーは一時的障害と判定される() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let error = InfraError::from(sqlx::Error::Io(io_error));

        assert!(error.is_transient());
    }

    #[test]
    fn test_プールタイムアウトは一時的障害と判定される() {
        let error = InfraError::from(sqlx::Error::PoolTimedOut);

        assert!(error.is_transient());
    }

    #[test]
    fn test_行不在や入力エラーは一時的障害ではない() {
        assert!(!InfraError::from(sqlx::Error::RowNotFound).is_transient());
        assert!(!InfraError::invalid_input("bad").is_transient());
        assert!(!InfraError::unexpected("boom").is_transient());
    }

    #[test]
    fn test_displayはエラー種別のメッセージを表示する() {
        let error = InfraError::invalid_input("país inválido");

        assert_eq!(format!("{error}"), "入力エラー: país inválido");
    }
}
