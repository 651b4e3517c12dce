//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗（I/O 前に棄却） |
//! | `NotFound` | 404 Not Found | エンティティ不在または遷移不可能な状態 |
//! | `Forbidden` | 403 Forbidden | 権限不足 |
//! | `UnknownStage` | 500 | 保存済みステータス文字列が復号できない |
//!
//! ## 使用例
//!
//! ```rust
//! use sellotur_domain::DomainError;
//!
//! fn validate_block_size(size: i64) -> Result<(), DomainError> {
//!     if size > 1000 {
//!         return Err(DomainError::Validation(
//!             "ブロックサイズが大きすぎます".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    /// I/O を伴う処理の前に検出される。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない（または遷移できない状態にある）
    ///
    /// 存在しない場合と状態が不適合な場合を呼び出し元から区別できない形で
    /// 表現する。権限のない呼び出し元へ内部状態を漏らさないための設計。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"CertificationProcess", "Questionnaire" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 権限エラー
    ///
    /// ユーザーは特定できたが、操作の実行権限がない場合に使用する。
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 未対応のロール
    ///
    /// ロールスコープ解決（厳格パス）で、マッピングが定義されていない
    /// ロールが渡された場合に使用する。暗黙にスコープなしで続行しない。
    #[error("未対応のロールです: {0}")]
    UnsupportedRole(String),

    /// ステータス文字列の復号失敗
    ///
    /// `"<数字> - <名称>"` 形式の先頭数字が認識できない場合に使用する。
    /// 推測でステージを返すことはない。
    #[error("ステージを認識できないステータスです: {0:?}")]
    UnknownStage(String),
}
