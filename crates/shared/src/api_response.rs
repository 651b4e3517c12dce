//! # API レスポンスエンベロープ
//!
//! 公開 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 公開 API の統一レスポンス型
///
/// すべてのエンドポイントは成功時に `{ "data": T }` 形式で返す。
/// 失敗時は [`crate::ErrorResponse`] を使用し、成功データと失敗メッセージが
/// 同じレスポンスに混在することはない。
///
/// ## 使用例
///
/// ```
/// use sellotur_shared::ApiResponse;
///
/// let response = ApiResponse::new("hola");
/// assert_eq!(response.data, "hola");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
